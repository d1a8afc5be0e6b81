use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::{Block, BlockData, BlockKey, BlockKind, CharacterMeta, ContentModel, InlineStyle};
use crate::entity::{Entity, EntityKey, EntityMap};
use crate::error::{EditorError, EditorResult};

const DEFAULT_SCHEMA: &str = "docblocks";
const DEFAULT_VERSION: u32 = 1;

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Persisted document envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub content: RawContent,
}

impl DocumentValue {
    pub fn from_content(content: &ContentModel) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            content: content.to_raw(),
        }
    }

    pub fn into_content(self) -> EditorResult<ContentModel> {
        ContentModel::from_raw(self.content)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: BTreeMap<EntityKey, Entity>,
}

/// Offsets and lengths count chars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: BlockKey,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_ranges: Vec<RawEntityRange>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BlockData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    pub offset: usize,
    pub length: usize,
    pub style: InlineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
}

impl ContentModel {
    pub fn to_raw(&self) -> RawContent {
        let blocks = self.blocks().map(raw_block).collect();
        let entity_map = self
            .entities()
            .iter()
            .map(|(key, entity)| (key, entity.clone()))
            .collect();
        RawContent { blocks, entity_map }
    }

    /// Rebuilds a content model, rejecting duplicate keys, out-of-range spans and
    /// references to missing entities.
    pub fn from_raw(raw: RawContent) -> EditorResult<ContentModel> {
        let mut entities = EntityMap::default();
        for (key, entity) in raw.entity_map {
            entities.insert_with_key(key, entity);
        }

        let mut seen: HashSet<BlockKey> = HashSet::new();
        let mut blocks = Vec::with_capacity(raw.blocks.len());
        for raw_block in raw.blocks {
            if !seen.insert(raw_block.key.clone()) {
                return Err(EditorError::InvalidDocument(format!(
                    "duplicate block key `{}`",
                    raw_block.key
                )));
            }
            blocks.push(block_from_raw(raw_block, &entities)?);
        }
        Ok(ContentModel::with_entities(blocks, entities))
    }
}

fn raw_block(block: &Block) -> RawBlock {
    let chars = block.characters();

    let mut inline_style_ranges = Vec::new();
    for style in InlineStyle::ALL {
        for (offset, length) in runs(chars, |meta| meta.styles.contains(style)) {
            inline_style_ranges.push(RawStyleRange {
                offset,
                length,
                style,
            });
        }
    }

    let mut entity_ranges = Vec::new();
    let mut ix = 0;
    while ix < chars.len() {
        let Some(key) = chars[ix].entity else {
            ix += 1;
            continue;
        };
        let start = ix;
        while ix < chars.len() && chars[ix].entity == Some(key) {
            ix += 1;
        }
        entity_ranges.push(RawEntityRange {
            offset: start,
            length: ix - start,
            key,
        });
    }

    RawBlock {
        key: block.key().clone(),
        kind: block.kind(),
        text: block.text().to_string(),
        depth: block.depth(),
        inline_style_ranges,
        entity_ranges,
        data: block.data().clone(),
    }
}

fn runs(chars: &[CharacterMeta], on: impl Fn(&CharacterMeta) -> bool) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (ix, meta) in chars.iter().enumerate() {
        match (on(meta), start) {
            (true, None) => start = Some(ix),
            (false, Some(s)) => {
                out.push((s, ix - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, chars.len() - s));
    }
    out
}

fn block_from_raw(raw: RawBlock, entities: &EntityMap) -> EditorResult<Block> {
    let len = raw.text.chars().count();
    let mut characters = vec![CharacterMeta::default(); len];
    let out_of_range = |offset: usize, length: usize| {
        EditorError::InvalidDocument(format!(
            "range {offset}+{length} exceeds block `{}` ({len} chars)",
            raw.key
        ))
    };

    let end_of = |offset: usize, length: usize| {
        offset
            .checked_add(length)
            .filter(|end| *end <= len)
            .ok_or_else(|| out_of_range(offset, length))
    };

    for range in &raw.inline_style_ranges {
        let end = end_of(range.offset, range.length)?;
        for meta in &mut characters[range.offset..end] {
            meta.styles = meta.styles.with(range.style, true);
        }
    }
    for range in &raw.entity_ranges {
        let end = end_of(range.offset, range.length)?;
        if !entities.contains(range.key) {
            return Err(EditorError::InvalidDocument(format!(
                "block `{}` references missing entity {}",
                raw.key, range.key
            )));
        }
        for meta in &mut characters[range.offset..end] {
            meta.entity = Some(range.key);
        }
    }

    Ok(Block::new(raw.key, raw.kind, "")
        .with_depth(raw.depth)
        .with_data(raw.data)
        .with_characters(raw.text, characters))
}
