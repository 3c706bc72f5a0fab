//! Shared test fixtures for integration tests.
//!
//! Each test gets its own temporary directory holding a listings file and its
//! own [`SearchState`] with an empty cache, so tests never share cached data.

use listing_search::{SearchConfig, SearchState};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A small Cartagena/Medellín catalog using the Spanish field names.
pub const LISTINGS_JSON: &str = r#"{
  "propiedades": [
    {
      "codigo": "CTG-1",
      "titulo": "Apartamento en Bocagrande",
      "ciudad": "Cartagena",
      "barrio": "Bocagrande",
      "tipo": "Apartamento",
      "precio": 850000000,
      "habitaciones": 3,
      "banos": 2,
      "parqueadero": 1,
      "piscina": true
    },
    {
      "codigo": "CTG-2",
      "titulo": "Casa colonial en Manga",
      "ciudad": "Cartagena",
      "barrio": "Manga",
      "tipo": "Casa",
      "precio": "1.200.000.000",
      "habitaciones": 4,
      "banos": 3,
      "caracteristicas": ["Patio interior", "Terraza"]
    },
    {
      "codigo": "CTG-3",
      "titulo": "Apartaestudio frente al mar",
      "ciudad": "Cartagena",
      "barrio": "Bocagrande",
      "tipo": "Apartaestudio",
      "habitaciones": 1,
      "piscina": "si"
    },
    {
      "codigo": "MED-1",
      "titulo": "Apartamento en El Poblado",
      "ciudad": "Medellín",
      "barrio": "El Poblado",
      "tipo": "Apartamento",
      "habitaciones": 3,
      "gimnasio": true
    }
  ]
}"#;

/// A temporary directory that is removed when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes (or overwrites) a file and returns its full path.
    ///
    /// # Panics
    /// Panics if the write fails.
    pub fn create_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(path);
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
        full_path
    }
}

/// A listings file plus search state whose default source points at it.
#[allow(dead_code)]
pub struct ListingWorkspace {
    pub workspace: TempWorkspace,
    pub source: PathBuf,
    pub state: Arc<SearchState>,
}

#[allow(dead_code)]
#[fixture]
pub fn listing_workspace() -> ListingWorkspace {
    listing_search::tracing::init();

    let workspace = TempWorkspace::new();
    let source = workspace.create_file("listings.json", LISTINGS_JSON);
    let config = SearchConfig {
        source: Some(source.clone()),
        ..SearchConfig::default()
    };
    let state = SearchState::new(config).expect("built-in vocabularies are valid");

    ListingWorkspace {
        workspace,
        source,
        state: Arc::new(state),
    }
}
