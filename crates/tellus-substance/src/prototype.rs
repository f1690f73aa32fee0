use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::catalog::SubstanceCatalog;
use super::config::PrototypesConfig;
use super::types::{PrototypeId, SubstanceId};

/// A movable-object kind: the things a block's inventory can hold.
#[derive(Clone, Debug)]
pub struct Prototype {
    pub id: PrototypeId,
    pub name: String,
    pub substance: SubstanceId,
}

#[derive(Default, Clone, Debug)]
pub struct PrototypeCatalog {
    pub prototypes: Vec<Prototype>,
    pub by_name: HashMap<String, PrototypeId>,
}

impl PrototypeCatalog {
    /// Id of the `anomaly` sentinel, always present.
    pub const ANOMALY: PrototypeId = PrototypeId(0);

    pub fn from_path(
        path: impl AsRef<Path>,
        substances: &SubstanceCatalog,
    ) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s, substances)
    }

    pub fn from_toml_str(
        toml_str: &str,
        substances: &SubstanceCatalog,
    ) -> Result<Self, Box<dyn Error>> {
        let cfg: PrototypesConfig = toml::from_str(toml_str)?;
        let mut entries: Vec<_> = cfg.prototypes.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut cat = PrototypeCatalog::default();
        cat.push_sentinel();
        for (name, entry) in entries {
            if name == "anomaly" {
                continue;
            }
            let substance = substances.try_id(&entry.substance).ok_or_else(|| {
                format!(
                    "prototype '{}': unknown substance '{}'",
                    name, entry.substance
                )
            })?;
            let id = PrototypeId(cat.prototypes.len() as u16);
            cat.by_name.insert(name.clone(), id);
            cat.prototypes.push(Prototype {
                id,
                name,
                substance,
            });
        }
        Ok(cat)
    }

    fn push_sentinel(&mut self) {
        self.by_name.insert("anomaly".to_string(), PrototypeId(0));
        self.prototypes.push(Prototype {
            id: PrototypeId(0),
            name: "anomaly".to_string(),
            substance: SubstanceCatalog::NOTHING,
        });
    }

    #[inline]
    pub fn get(&self, id: PrototypeId) -> &Prototype {
        &self.prototypes[id.0 as usize]
    }

    #[inline]
    pub fn try_id(&self, name: &str) -> Option<PrototypeId> {
        self.by_name.get(name).copied()
    }

    /// Lookup by name, degrading to the `anomaly` sentinel with a warning.
    pub fn get_by_name(&self, name: &str) -> &Prototype {
        match self.try_id(name) {
            Some(id) => self.get(id),
            None => {
                log::warn!("unknown prototype '{}', substituting 'anomaly'", name);
                self.get(Self::ANOMALY)
            }
        }
    }

    /// Built-in prototypes for the flora pass and tests.
    pub fn builtin(substances: &SubstanceCatalog) -> Self {
        Self::from_toml_str(BUILTIN_PROTOTYPES_TOML, substances)
            .expect("built-in prototype catalog must parse")
    }
}

pub const BUILTIN_PROTOTYPES_TOML: &str = r#"
[prototypes.grass_tuft]
substance = "loam"

[prototypes.oak_tree]
substance = "loam"

[prototypes.pine_tree]
substance = "loam"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_sentinel_and_fallback() {
        let subs = SubstanceCatalog::builtin();
        let cat = PrototypeCatalog::builtin(&subs);
        assert_eq!(cat.try_id("anomaly"), Some(PrototypeCatalog::ANOMALY));
        assert_eq!(cat.get_by_name("wyvern").id, PrototypeCatalog::ANOMALY);
        assert!(cat.try_id("grass_tuft").is_some());
    }

    #[test]
    fn unknown_substance_is_a_load_error() {
        let subs = SubstanceCatalog::builtin();
        let toml = "[prototypes.ghost]\nsubstance = \"ectoplasm\"\n";
        assert!(PrototypeCatalog::from_toml_str(toml, &subs).is_err());
    }
}
