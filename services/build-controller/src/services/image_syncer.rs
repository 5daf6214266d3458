use build_core::image_refs::rewrite_image_overrides;
use kube::ResourceExt;
use tracing::info;

use crate::error::AppError;
use crate::services::store::ApplicationStore;

/// Points every kustomize override named `image_name` at `new_ref`.
///
/// Applications whose override list would not change get no API call.
/// Returns how many applications were patched.
#[tracing::instrument("sync_image_refs", skip_all, fields(image_name = %image_name), err)]
pub async fn sync_image_refs<S: ApplicationStore>(
    store: &S,
    namespace: &str,
    image_name: &str,
    new_ref: &str,
) -> Result<usize, AppError> {
    let applications = store.list_applications(namespace).await?;
    let mut patched = 0;

    for application in applications {
        let Some(images) = application
            .spec
            .source
            .as_ref()
            .and_then(|source| source.kustomize.as_ref())
            .and_then(|kustomize| kustomize.images.as_ref())
            .filter(|images| !images.is_empty())
        else {
            continue;
        };

        let Some(rewritten) = rewrite_image_overrides(images, image_name, new_ref) else {
            continue;
        };

        let name = application.name_any();
        store
            .replace_application_images(namespace, &name, &rewritten)
            .await?;

        info!(namespace, application = %name, new_ref, "🔁 Image reference updated");
        patched += 1;
    }

    Ok(patched)
}

#[cfg(test)]
mod tests {
    use build_core::crds::Application;
    use serde_json::json;

    use super::*;
    use crate::services::store::fake::{FakeState, FakeStore};

    fn application(name: &str, namespace: &str, images: Option<&[&str]>) -> Application {
        let mut source = json!({ "repoURL": "https://github.com/example/deploy" });
        if let Some(images) = images {
            source["kustomize"] = json!({ "images": images });
        }

        serde_json::from_value(json!({
            "apiVersion": "argoproj.io/v1alpha1",
            "kind": "Application",
            "metadata": { "name": name, "namespace": namespace },
            "spec": { "project": "default", "source": source },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_rewrites_only_matching_application() {
        let store = FakeStore::new(FakeState {
            applications: vec![
                application("web", "argocd", Some(&["app=old@sha256:a", "other=x"])),
                application("api", "argocd", Some(&["api=x@sha256:c"])),
                application("plain", "argocd", None),
            ],
            ..Default::default()
        });

        let patched = sync_image_refs(&store, "argocd", "app", "ghcr.io/x/app@sha256:b")
            .await
            .unwrap();

        assert_eq!(patched, 1);
        let state = store.state();
        assert_eq!(
            state.image_patches,
            vec![(
                "argocd/web".to_string(),
                vec![
                    "app=ghcr.io/x/app@sha256:b".to_string(),
                    "other=x".to_string()
                ],
            )]
        );
    }

    #[tokio::test]
    async fn test_no_patch_without_matching_override() {
        let store = FakeStore::new(FakeState {
            applications: vec![application(
                "web",
                "argocd",
                Some(&["application=x", "other=y"]),
            )],
            ..Default::default()
        });

        let patched = sync_image_refs(&store, "argocd", "app", "ghcr.io/x/app@sha256:b")
            .await
            .unwrap();

        assert_eq!(patched, 0);
        assert!(store.state().image_patches.is_empty());
    }

    #[tokio::test]
    async fn test_already_current_reference_is_not_patched() {
        let store = FakeStore::new(FakeState {
            applications: vec![application(
                "web",
                "argocd",
                Some(&["app=ghcr.io/x/app@sha256:b"]),
            )],
            ..Default::default()
        });

        sync_image_refs(&store, "argocd", "app", "ghcr.io/x/app@sha256:b")
            .await
            .unwrap();

        assert!(store.state().image_patches.is_empty());
    }

    #[tokio::test]
    async fn test_applications_outside_namespace_are_ignored() {
        let store = FakeStore::new(FakeState {
            applications: vec![application("web", "other-ns", Some(&["app=old"]))],
            ..Default::default()
        });

        let patched = sync_image_refs(&store, "argocd", "app", "ghcr.io/x/app@sha256:b")
            .await
            .unwrap();

        assert_eq!(patched, 0);
    }
}
