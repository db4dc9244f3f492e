//! Scene description
//!
//! A scene is a TOML file listing the blocks of a page top to bottom, which
//! of them are sticky, and the scroll offsets to replay.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sticky::backend::HeadlessDocument;
use sticky::{ControllerId, StickyConfig, StickyOverrides, StickyPage};

/// Page layout and scroll script
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Scene {
    #[serde(default = "Scene::default_viewport_height")]
    pub viewport_height: f64,

    /// Configuration shared by every sticky block
    #[serde(default)]
    pub sticky: StickyConfig,

    /// Blocks from the top of the page down
    #[serde(default, rename = "block")]
    pub blocks: Vec<BlockSpec>,

    /// Absolute scroll offsets, applied in order
    #[serde(default)]
    pub scroll: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BlockSpec {
    pub label: String,

    /// Height of the block (for sticky blocks, the height of their content)
    pub height: f64,

    #[serde(default)]
    pub sticky: bool,

    /// Per-block overrides, only used when `sticky` is set
    #[serde(default)]
    pub config: StickyOverrides,
}

/// A scene turned into a live page
pub(crate) struct BuiltScene {
    pub doc: Rc<HeadlessDocument>,
    pub page: StickyPage<HeadlessDocument>,
    labels: HashMap<ControllerId, String>,
}

impl BuiltScene {
    pub fn label(&self, id: ControllerId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl Scene {
    fn default_viewport_height() -> f64 {
        600.0
    }

    /// Load and validate a scene file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scene {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid scene {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(content).context("failed to parse scene TOML")?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> Result<()> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            bail!("viewport_height must be positive, got {}", self.viewport_height);
        }
        for block in &self.blocks {
            if !(block.height.is_finite() && block.height >= 0.0) {
                bail!("block '{}' has invalid height {}", block.label, block.height);
            }
        }
        if !self.blocks.iter().any(|block| block.sticky) {
            bail!("scene has no sticky blocks");
        }
        if let Some(offset) = self.scroll.iter().find(|offset| !offset.is_finite()) {
            bail!("invalid scroll offset {}", offset);
        }
        Ok(())
    }

    /// Build the page. Sticky blocks become a host wrapping a content block.
    pub fn build(&self) -> Result<BuiltScene> {
        let doc = Rc::new(HeadlessDocument::new(self.viewport_height));
        let mut page = StickyPage::with_config(Rc::clone(&doc), self.sticky.clone());
        let mut labels = HashMap::new();
        let root = doc.root();

        for block in &self.blocks {
            if !block.sticky {
                doc.add_block(root, &block.label, block.height)?;
                continue;
            }

            let host = doc.add_container(root, &block.label)?;
            doc.add_block(host, &format!("{}-content", block.label), block.height)?;
            let id = page
                .attach(host, &block.config)
                .with_context(|| format!("failed to attach sticky block '{}'", block.label))?;
            labels.insert(id, block.label.clone());
        }

        tracing::info!(
            blocks = self.blocks.len(),
            sticky = labels.len(),
            document_height = doc.document_height(),
            "scene built"
        );

        Ok(BuiltScene { doc, page, labels })
    }
}
