/// `<configName>-h<number>`
pub fn format_build_name(config_name: &str, number: i64) -> String {
    format!("{config_name}-h{number}")
}

/// Fully-qualified push target for a configured output name.
///
/// Names containing a `/` already carry a registry path and are used verbatim,
/// anything else lands under `default_registry`.
pub fn format_target_image(output_name: &str, default_registry: &str) -> String {
    if output_name.contains('/') {
        output_name.to_string()
    } else {
        format!("{}/{}", default_registry.trim_end_matches('/'), output_name)
    }
}

/// Canonical `registry/repo@digest` for a pushed image.
///
/// Any tag or digest already on the target is dropped. Only the last path
/// segment is inspected, so registry ports survive.
pub fn format_digest_reference(target_image: &str, digest: &str) -> String {
    let repository = target_image
        .split_once('@')
        .map_or(target_image, |(repo, _)| repo);
    let name_start = repository.rfind('/').map_or(0, |i| i + 1);
    let repository = match repository[name_start..].find(':') {
        Some(i) => &repository[..name_start + i],
        None => repository,
    };

    format!("{repository}@{digest}")
}
