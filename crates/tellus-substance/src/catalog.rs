use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::config::{DepositEntry, SubstanceEntry, SubstancesConfig};
use super::types::{DepositKind, Phase, SubstanceId, Visibility};

#[derive(Clone, Debug)]
pub struct Substance {
    pub id: SubstanceId,
    pub name: String,
    pub phase: Phase,
    pub visibility: Visibility,
    pub color: [f32; 3],
    pub specular: [f32; 3],
    // Substances that may be embedded in this host, per deposit category.
    pub deposits: [Vec<SubstanceId>; 5],
}

impl Substance {
    #[inline]
    pub fn deposit_pool(&self, kind: DepositKind) -> &[SubstanceId] {
        &self.deposits[kind.index()]
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.visibility == Visibility::Opaque
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility != Visibility::Invisible
    }
}

#[derive(Default, Clone, Debug)]
pub struct SubstanceCatalog {
    pub substances: Vec<Substance>,
    pub by_name: HashMap<String, SubstanceId>,
}

impl SubstanceCatalog {
    /// Id of the `nothing` sentinel, always present.
    pub const NOTHING: SubstanceId = SubstanceId(0);

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: SubstancesConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: SubstancesConfig) -> Result<Self, Box<dyn Error>> {
        let mut entries: Vec<(String, SubstanceEntry)> = cfg.substances.into_iter().collect();
        // HashMap iteration order is nondeterministic; sort keys so id assignment is stable.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut catalog = SubstanceCatalog::default();
        catalog.push_sentinels();
        for (name, entry) in &entries {
            if name == "nothing" || name == "air" {
                continue;
            }
            let id = SubstanceId(catalog.substances.len() as u16);
            catalog.by_name.insert(name.clone(), id);
            catalog.substances.push(Substance {
                id,
                name: name.clone(),
                phase: entry.phase,
                visibility: entry.visibility,
                color: entry.color,
                specular: entry.specular,
                deposits: Default::default(),
            });
        }
        // Affinity lists reference other substances by name; resolve them once
        // every substance has an id, erroring on names that do not exist.
        for (name, entry) in &entries {
            if name == "nothing" || name == "air" {
                continue;
            }
            let id = catalog.by_name[name];
            let resolved = catalog.resolve_deposits(name, &entry.deposits)?;
            catalog.substances[id.0 as usize].deposits = resolved;
        }
        Ok(catalog)
    }

    fn push_sentinels(&mut self) {
        for (name, phase) in [("nothing", Phase::Empty), ("air", Phase::Gas)] {
            let id = SubstanceId(self.substances.len() as u16);
            self.by_name.insert(name.to_string(), id);
            self.substances.push(Substance {
                id,
                name: name.to_string(),
                phase,
                visibility: Visibility::Invisible,
                color: [0.0, 0.0, 0.0],
                specular: [0.0, 0.0, 0.0],
                deposits: Default::default(),
            });
        }
    }

    fn resolve_deposits(
        &self,
        host: &str,
        entry: &DepositEntry,
    ) -> Result<[Vec<SubstanceId>; 5], Box<dyn Error>> {
        let mut out: [Vec<SubstanceId>; 5] = Default::default();
        let lists = [
            (DepositKind::Large, &entry.large),
            (DepositKind::Small, &entry.small),
            (DepositKind::Vein, &entry.vein),
            (DepositKind::Solitary, &entry.solitary),
            (DepositKind::Gangue, &entry.gangue),
        ];
        for (kind, names) in lists {
            for n in names {
                let id = self.try_id(n).ok_or_else(|| {
                    format!(
                        "substance '{}': unknown {} deposit substance '{}'",
                        host,
                        kind.label(),
                        n
                    )
                })?;
                out[kind.index()].push(id);
            }
        }
        Ok(out)
    }

    #[inline]
    pub fn get(&self, id: SubstanceId) -> &Substance {
        &self.substances[id.0 as usize]
    }

    #[inline]
    pub fn try_id(&self, name: &str) -> Option<SubstanceId> {
        self.by_name.get(name).copied()
    }

    /// Lookup by name, degrading to the `nothing` sentinel with a warning.
    pub fn get_by_name(&self, name: &str) -> &Substance {
        match self.try_id(name) {
            Some(id) => self.get(id),
            None => {
                log::warn!("unknown substance '{}', substituting 'nothing'", name);
                self.get(Self::NOTHING)
            }
        }
    }

    #[inline]
    pub fn air(&self) -> SubstanceId {
        self.by_name["air"]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.substances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.substances.is_empty()
    }

    /// Built-in catalog used by the headless binary when no substances file is
    /// given, and by tests. Covers the strata bands, fluids, and a handful of
    /// ore deposits.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_SUBSTANCES_TOML)
            .expect("built-in substance catalog must parse")
    }
}

pub const BUILTIN_SUBSTANCES_TOML: &str = r#"
[substances.water]
phase = "liquid"
visibility = "transparent"
color = [0.16, 0.32, 0.60]

[substances.sand]
phase = "solid"
visibility = "opaque"
color = [0.86, 0.79, 0.59]

[substances.loam]
phase = "solid"
visibility = "opaque"
color = [0.42, 0.30, 0.18]

[substances.clay]
phase = "solid"
visibility = "opaque"
color = [0.63, 0.51, 0.44]

[substances.sandstone]
phase = "solid"
visibility = "opaque"
color = [0.77, 0.68, 0.50]
[substances.sandstone.deposits]
large = ["halite"]
small = ["hematite"]
vein = ["coal"]
solitary = ["quartz"]
gangue = ["calcite"]

[substances.limestone]
phase = "solid"
visibility = "opaque"
color = [0.78, 0.76, 0.70]
[substances.limestone.deposits]
large = ["halite"]
small = ["galena"]
vein = ["coal"]
solitary = ["quartz"]
gangue = ["calcite"]

[substances.shale]
phase = "solid"
visibility = "opaque"
color = [0.45, 0.44, 0.42]
[substances.shale.deposits]
small = ["hematite"]
vein = ["coal"]
gangue = ["calcite"]

[substances.slate]
phase = "solid"
visibility = "opaque"
color = [0.35, 0.36, 0.40]
[substances.slate.deposits]
small = ["galena"]
vein = ["quartz"]
solitary = ["garnet"]
gangue = ["calcite"]

[substances.marble]
phase = "solid"
visibility = "opaque"
color = [0.88, 0.87, 0.84]
[substances.marble.deposits]
large = ["magnetite"]
vein = ["quartz"]
solitary = ["garnet"]

[substances.granite]
phase = "solid"
visibility = "opaque"
color = [0.58, 0.52, 0.50]
[substances.granite.deposits]
large = ["magnetite"]
small = ["cassiterite"]
vein = ["quartz"]
solitary = ["garnet"]
gangue = ["feldspar"]

[substances.basalt]
phase = "solid"
visibility = "opaque"
color = [0.25, 0.25, 0.27]
[substances.basalt.deposits]
large = ["magnetite"]
small = ["cassiterite"]
vein = ["quartz"]
gangue = ["feldspar"]

[substances.magnetite]
phase = "solid"
visibility = "opaque"
color = [0.15, 0.14, 0.16]

[substances.hematite]
phase = "solid"
visibility = "opaque"
color = [0.48, 0.20, 0.16]

[substances.galena]
phase = "solid"
visibility = "opaque"
color = [0.42, 0.44, 0.48]

[substances.cassiterite]
phase = "solid"
visibility = "opaque"
color = [0.30, 0.26, 0.20]

[substances.coal]
phase = "solid"
visibility = "opaque"
color = [0.10, 0.10, 0.10]

[substances.quartz]
phase = "solid"
visibility = "opaque"
color = [0.90, 0.90, 0.92]

[substances.garnet]
phase = "solid"
visibility = "opaque"
color = [0.55, 0.12, 0.16]

[substances.halite]
phase = "solid"
visibility = "opaque"
color = [0.92, 0.92, 0.90]

[substances.calcite]
phase = "solid"
visibility = "opaque"
color = [0.85, 0.84, 0.78]

[substances.feldspar]
phase = "solid"
visibility = "opaque"
color = [0.80, 0.72, 0.66]
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_always_present() {
        let cat = SubstanceCatalog::from_toml_str("[substances]").unwrap();
        assert_eq!(cat.try_id("nothing"), Some(SubstanceId(0)));
        assert!(cat.try_id("air").is_some());
        assert_eq!(cat.get(SubstanceCatalog::NOTHING).phase, Phase::Empty);
        assert_eq!(cat.get(cat.air()).phase, Phase::Gas);
    }

    #[test]
    fn missing_name_degrades_to_nothing() {
        let cat = SubstanceCatalog::builtin();
        let s = cat.get_by_name("unobtainium");
        assert_eq!(s.id, SubstanceCatalog::NOTHING);
    }

    #[test]
    fn unknown_affinity_name_is_a_load_error() {
        let toml = r#"
            [substances.rock]
            phase = "solid"
            visibility = "opaque"
            [substances.rock.deposits]
            vein = ["no_such_thing"]
        "#;
        let err = SubstanceCatalog::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("no_such_thing"));
    }

    #[test]
    fn id_assignment_is_name_sorted_and_stable() {
        let cat = SubstanceCatalog::builtin();
        let a = SubstanceCatalog::from_toml_str(BUILTIN_SUBSTANCES_TOML).unwrap();
        for (x, y) in cat.substances.iter().zip(a.substances.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.name, y.name);
        }
        let names: Vec<&str> = cat.substances[2..].iter().map(|s| s.name.as_str()).collect();
        let sorted = {
            let mut v = names.clone();
            v.sort();
            v
        };
        assert_eq!(names, sorted, "non-sentinel ids follow sorted name order");
    }

    #[test]
    fn builtin_pools_resolve() {
        let cat = SubstanceCatalog::builtin();
        let granite = cat.get_by_name("granite");
        assert!(!granite.deposit_pool(DepositKind::Large).is_empty());
        assert!(!granite.deposit_pool(DepositKind::Gangue).is_empty());
        let water = cat.get_by_name("water");
        assert!(water.deposit_pool(DepositKind::Large).is_empty());
    }
}
