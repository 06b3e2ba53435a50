//! Schema loader
//!
//! Schemas live one per file, `<schema_dir>/<name>.json`, and are looked up
//! by file stem. A loader without a directory serves the built-in set that
//! ships in `schemas/`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{SchemaError, SchemaResult};
use super::types::Schema;

/// Schemas compiled into the binary, keyed by endpoint
const BUILTIN: &[(&str, &str)] = &[
    ("add_card", include_str!("../../schemas/add_card.json")),
    ("get_card", include_str!("../../schemas/get_card.json")),
    (
        "get_card_by_token",
        include_str!("../../schemas/get_card_by_token.json"),
    ),
    ("get_card_image", include_str!("../../schemas/get_card_image.json")),
    ("activate_card", include_str!("../../schemas/activate_card.json")),
    ("suspend_card", include_str!("../../schemas/suspend_card.json")),
    ("get_pin", include_str!("../../schemas/get_pin.json")),
];

/// In-memory schema registry, filled once at startup
#[derive(Debug, Default)]
pub struct SchemaLoader {
    /// Directory containing schema files, if any
    schema_dir: Option<PathBuf>,
    /// Loaded schemas indexed by name
    schemas: BTreeMap<String, Schema>,
}

impl SchemaLoader {
    /// Creates an empty loader reading from `schema_dir`
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: Some(schema_dir.to_path_buf()),
            schemas: BTreeMap::new(),
        }
    }

    /// Creates a loader holding the built-in endpoint schemas
    pub fn builtin() -> SchemaResult<Self> {
        let mut loader = Self::default();
        for (name, content) in BUILTIN {
            loader.register(Schema::from_json(*name, content)?)?;
        }
        Ok(loader)
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// A malformed file fails the whole load.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        let Some(dir) = self.schema_dir.clone() else {
            return Ok(());
        };

        let entries = fs::read_dir(&dir).map_err(|source| SchemaError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SchemaError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            self.load_schema_file(&path)?;
        }

        Ok(())
    }

    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| SchemaError::malformed(path.display().to_string(), "bad file name"))?
            .to_string();

        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;

        self.register(Schema::from_json(name, &content)?)
    }

    /// Registers a schema directly
    pub fn register(&mut self, schema: Schema) -> SchemaResult<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(SchemaError::Duplicate(schema.name));
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Gets a schema by name
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Checks if a schema exists
    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns all loaded schemas, ordered by name
    pub fn all_schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Returns the number of loaded schemas
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
