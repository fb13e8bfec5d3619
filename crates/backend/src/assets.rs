use paddock_shared::models::Paddock;
use std::path::Path;

pub struct Assets {
    pub paddocks: Vec<Paddock>,
}

impl Assets {
    pub fn load(assets_dir: &Path) -> Result<Self, String> {
        let paddocks_path = assets_dir.join("paddocks.json");

        let paddocks_data = std::fs::read_to_string(&paddocks_path)
            .map_err(|e| format!("Failed to read {}: {}", paddocks_path.display(), e))?;

        let paddocks: Vec<Paddock> = serde_json::from_str(&paddocks_data)
            .map_err(|e| format!("Failed to parse paddocks.json: {}", e))?;

        if let Some(bad) = paddocks.iter().find(|p| p.polygon.len() < 3) {
            return Err(format!(
                "Paddock {:?} needs at least 3 polygon points, got {}",
                bad.name,
                bad.polygon.len()
            ));
        }

        tracing::info!(paddocks = paddocks.len(), "Loaded paddock assets");

        Ok(Assets { paddocks })
    }

    pub fn find_paddock(&self, name: &str) -> Option<&Paddock> {
        self.paddocks.iter().find(|p| p.name == name)
    }
}
