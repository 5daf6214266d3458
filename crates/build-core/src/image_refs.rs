/// Name segment of a kustomize `name=ref` override.
fn override_name(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(name, _)| name)
}

/// Points every override named `image_name` at `new_ref`.
///
/// Returns `None` when the rewritten list is identical to `images`, so callers
/// can skip the write entirely.
pub fn rewrite_image_overrides(
    images: &[String],
    image_name: &str,
    new_ref: &str,
) -> Option<Vec<String>> {
    let rewritten: Vec<String> = images
        .iter()
        .map(|entry| {
            if override_name(entry) == image_name {
                format!("{image_name}={new_ref}")
            } else {
                entry.clone()
            }
        })
        .collect();

    (rewritten.as_slice() != images).then_some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rewrites_matching_entry_only() {
        let images = strings(&["app=old@sha256:a", "other=x"]);

        let rewritten = rewrite_image_overrides(&images, "app", "ghcr.io/x/app@sha256:b");

        assert_eq!(
            rewritten,
            Some(strings(&["app=ghcr.io/x/app@sha256:b", "other=x"]))
        );
    }

    #[test]
    fn test_no_match_means_no_change() {
        let images = strings(&["other=x", "third=y"]);

        let rewritten = rewrite_image_overrides(&images, "app", "ghcr.io/x/app@sha256:b");

        assert_eq!(rewritten, None);
    }

    #[test]
    fn test_match_is_exact_not_substring() {
        let images = strings(&["app-worker=old", "myapp=old"]);

        assert_eq!(rewrite_image_overrides(&images, "app", "new"), None);
    }

    #[test]
    fn test_already_current_is_no_change() {
        let images = strings(&["app=ghcr.io/x/app@sha256:b"]);

        assert_eq!(
            rewrite_image_overrides(&images, "app", "ghcr.io/x/app@sha256:b"),
            None
        );
    }

    #[test]
    fn test_entry_without_ref_is_matched_by_whole_name() {
        let images = strings(&["app"]);

        assert_eq!(
            rewrite_image_overrides(&images, "app", "r@sha256:b"),
            Some(strings(&["app=r@sha256:b"]))
        );
    }
}
