//! Flat field storage keyed by canonical dotted path.

use rustc_hash::FxHashMap;

use crate::field::{normalize_options, Field, FieldState};
use crate::schema::FieldDef;
use crate::{FormError, FormResult};

/// All field records, in declaration order.
///
/// Storage is flat: `app.name` does not require an `app` field. Index
/// positions double as declaration order everywhere in the engine.
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    fields: Vec<Field>,
    index: FxHashMap<String, usize>,
}

impl FieldStore {
    /// Build the store. Duplicate keys are a schema error.
    pub fn from_defs(defs: &[FieldDef]) -> FormResult<Self> {
        let mut store = FieldStore::default();
        for def in defs {
            if store.index.contains_key(&def.key) {
                return Err(FormError::Schema(format!("duplicate field key `{}`", def.key)));
            }
            if def.key.is_empty() {
                return Err(FormError::Schema("field key must not be empty".into()));
            }
            let state = FieldState {
                value: def.value.clone(),
                options: def.options.as_ref().map(normalize_options).unwrap_or_default(),
                visible: def.visible,
                disabled: def.disabled,
                required: def.required,
                errors: Vec::new(),
            };
            store.index.insert(def.key.clone(), store.fields.len());
            store.fields.push(Field {
                key: def.key.clone(),
                name: def.name.clone(),
                field_type: def.field_type,
                description: def.description.clone(),
                data_source: def.data_source.clone(),
                render: def.render,
                dependencies: def.dependencies.clone(),
                defaults: state.clone(),
                state,
            });
        }
        for field in &store.fields {
            if let Some(missing) = field.dependencies.iter().find(|d| !store.contains(d)) {
                return Err(FormError::Schema(format!(
                    "field `{}` depends on undeclared field `{missing}`",
                    field.key
                )));
            }
        }
        Ok(store)
    }

    #[inline]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Index of `key`, or `UnknownField`.
    pub fn require(&self, key: &str) -> FormResult<usize> {
        self.index_of(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    /// Field at a declaration index. Indices come from this store.
    #[inline]
    pub fn field(&self, idx: usize) -> &Field {
        &self.fields[idx]
    }

    #[inline]
    pub fn field_mut(&mut self, idx: usize) -> &mut Field {
        &mut self.fields[idx]
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.index_of(key).map(|idx| &self.fields[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn key(&self, idx: usize) -> &str {
        &self.fields[idx].key
    }
}
