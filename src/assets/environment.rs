//! Environment catalog
//!
//! Named cube-map environments the viewer can switch between. An entry with
//! no path stands for "no environment".

use serde::{Deserialize, Serialize};

use crate::resources::CubeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    pub name: String,
    /// Directory holding the six faces, with a trailing `/`
    pub path: Option<String>,
    /// Face file extension including the dot
    pub format: String,
}

impl EnvironmentEntry {
    pub fn new(name: &str, path: Option<&str>, format: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.map(str::to_string),
            format: format.to_string(),
        }
    }

    /// The six faces of this environment, `None` for a path-less entry.
    #[must_use]
    pub fn cube_map(&self) -> Option<CubeMap> {
        let path = self.path.as_deref()?;
        Some(CubeMap::from_directory(&self.name, path, &self.format))
    }
}

/// Environments shipped with the viewer. Index 1 (`White`) is the default.
#[must_use]
pub fn default_catalog() -> Vec<EnvironmentEntry> {
    vec![
        EnvironmentEntry::new("None", None, ".jpg"),
        EnvironmentEntry::new("White", Some("assets/environment/White/"), ".jpg"),
        EnvironmentEntry::new("Perspectives 1", Some("assets/environment/Selim00/"), ".png"),
        EnvironmentEntry::new("Park (Day)", Some("assets/environment/Park2/"), ".jpg"),
        EnvironmentEntry::new("Park (Night)", Some("assets/environment/Park3Med/"), ".jpg"),
        EnvironmentEntry::new("Bridge", Some("assets/environment/Bridge2/"), ".jpg"),
        EnvironmentEntry::new("Sky", Some("assets/environment/skybox/"), ".jpg"),
        EnvironmentEntry::new("Castle", Some("assets/environment/SwedishRoyalCastle/"), ".jpg"),
    ]
}

/// Finds an entry by its display name.
#[must_use]
pub fn find_environment<'a>(catalog: &'a [EnvironmentEntry], name: &str) -> Option<&'a EnvironmentEntry> {
    catalog.iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_entry_has_no_cube_map() {
        let catalog = default_catalog();
        assert!(find_environment(&catalog, "None").and_then(EnvironmentEntry::cube_map).is_none());
        let white = find_environment(&catalog, "White").and_then(EnvironmentEntry::cube_map).unwrap();
        assert_eq!(white.faces[2], "assets/environment/White/posy.jpg");
    }

    #[test]
    fn catalog_deserializes_from_json() {
        let json = r#"[{"name":"Studio","path":"env/studio/","format":".png"},{"name":"Off","path":null,"format":".jpg"}]"#;
        let catalog: Vec<EnvironmentEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(catalog[0].cube_map().unwrap().faces[0], "env/studio/posx.png");
        assert!(catalog[1].path.is_none());
    }
}
