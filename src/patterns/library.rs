use std::{collections::HashMap, path::PathBuf, sync::Arc};

use log::warn;
use tokio::sync::Mutex;

use super::shape::{parse_shape_csv, shape_resource, ShapePoint};

/// Session-lifetime cache of shape templates, keyed by resource name.
///
/// Templates are static reference data: a key is written once on first load
/// and never invalidated. Concurrent first loads of the same resource
/// collapse into a single read, and a result can only ever land in its own
/// key's slot. A failed load caches an empty template and is not retried.
#[derive(Clone)]
pub struct ShapeLibrary {
    shapes_dir: PathBuf,
    cache: Arc<Mutex<HashMap<String, Arc<Vec<ShapePoint>>>>>,
}

impl ShapeLibrary {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            shapes_dir: data_root.into().join("patternshapes"),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The template for a pattern id, or `None` when the id has no shape
    /// resource. The returned template may be empty (failed or degenerate
    /// load); empty templates draw no curve but the pattern still counts
    /// toward overlay presence.
    pub async fn template(&self, pattern_id: &str) -> Option<Arc<Vec<ShapePoint>>> {
        let resource = shape_resource(pattern_id)?;

        let mut cache = self.cache.lock().await;
        if let Some(template) = cache.get(resource) {
            return Some(Arc::clone(template));
        }

        let path = self.shapes_dir.join(resource);
        let template = match tokio::fs::read_to_string(&path).await {
            Ok(text) => Arc::new(parse_shape_csv(&text)),
            Err(err) => {
                warn!("unable to load pattern shape {resource}: {err}");
                Arc::new(Vec::new())
            }
        };
        cache.insert(resource.to_string(), Arc::clone(&template));
        Some(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn shapes_root(csv: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let shapes = dir.path().join("patternshapes");
        fs::create_dir_all(&shapes).unwrap();
        if let Some(csv) = csv {
            fs::write(shapes.join("dawn_phenomenon_summary_time_of_day.csv"), csv).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn loads_parses_and_caches() {
        let root = shapes_root(Some("time_minutes,median\n0,92\n5,95\n"));
        let library = ShapeLibrary::new(root.path());

        let first = library.template("dawn_phenomenon").await.unwrap();
        assert_eq!(first.len(), 2);

        // Rewriting the file must not be observable: the key was cached.
        fs::write(
            root.path().join("patternshapes/dawn_phenomenon_summary_time_of_day.csv"),
            "time_minutes,median\n0,1\n",
        )
        .unwrap();
        let second = library.template("dawn_phenomenon").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_load() {
        let root = shapes_root(Some("time_minutes,median\n0,92\n"));
        let library = ShapeLibrary::new(root.path());

        let (a, b) = tokio::join!(
            library.template("dawn_phenomenon"),
            library.template("dawn_phenomenon")
        );
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[tokio::test]
    async fn failed_load_caches_empty_template() {
        let root = shapes_root(None);
        let library = ShapeLibrary::new(root.path());

        let first = library.template("dawn_phenomenon").await.unwrap();
        assert!(first.is_empty());

        // Creating the file afterwards changes nothing: failures are final
        // for the session.
        fs::write(
            root.path().join("patternshapes/dawn_phenomenon_summary_time_of_day.csv"),
            "time_minutes,median\n0,92\n",
        )
        .unwrap();
        let second = library.template("dawn_phenomenon").await.unwrap();
        assert!(second.is_empty());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn shapeless_patterns_have_no_template() {
        let root = shapes_root(None);
        let library = ShapeLibrary::new(root.path());
        assert!(library.template("frequent_spike").await.is_none());
    }
}
