use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Entity, EntityKey, EntityMap};

pub type BlockData = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Title,
    Text,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    BulletList,
    NumberedList,
    ToggleList,
    CheckList,
    Table,
    SolidDivider,
    DashDivider,
    Banner,
    EmbedFigma,
    EmbedMiro,
    EmbedGoogleDrive,
    EmbedTrello,
    EmbedLoom,
    EmbedBookmark,
    Atomic,
}

impl BlockKind {
    pub const ALL: [BlockKind; 20] = [
        BlockKind::Title,
        BlockKind::Text,
        BlockKind::HeadingOne,
        BlockKind::HeadingTwo,
        BlockKind::HeadingThree,
        BlockKind::BulletList,
        BlockKind::NumberedList,
        BlockKind::ToggleList,
        BlockKind::CheckList,
        BlockKind::Table,
        BlockKind::SolidDivider,
        BlockKind::DashDivider,
        BlockKind::Banner,
        BlockKind::EmbedFigma,
        BlockKind::EmbedMiro,
        BlockKind::EmbedGoogleDrive,
        BlockKind::EmbedTrello,
        BlockKind::EmbedLoom,
        BlockKind::EmbedBookmark,
        BlockKind::Atomic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::Text => "text",
            BlockKind::HeadingOne => "heading-one",
            BlockKind::HeadingTwo => "heading-two",
            BlockKind::HeadingThree => "heading-three",
            BlockKind::BulletList => "bullet-list",
            BlockKind::NumberedList => "numbered-list",
            BlockKind::ToggleList => "toggle-list",
            BlockKind::CheckList => "check-list",
            BlockKind::Table => "table",
            BlockKind::SolidDivider => "solid-divider",
            BlockKind::DashDivider => "dash-divider",
            BlockKind::Banner => "banner",
            BlockKind::EmbedFigma => "embed-figma",
            BlockKind::EmbedMiro => "embed-miro",
            BlockKind::EmbedGoogleDrive => "embed-google-drive",
            BlockKind::EmbedTrello => "embed-trello",
            BlockKind::EmbedLoom => "embed-loom",
            BlockKind::EmbedBookmark => "embed-bookmark",
            BlockKind::Atomic => "atomic",
        }
    }

    pub fn is_heading(self) -> bool {
        matches!(
            self,
            BlockKind::HeadingOne | BlockKind::HeadingTwo | BlockKind::HeadingThree
        )
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            BlockKind::BulletList | BlockKind::NumberedList | BlockKind::CheckList
        )
    }

    pub fn is_divider(self) -> bool {
        matches!(self, BlockKind::SolidDivider | BlockKind::DashDivider)
    }

    pub fn is_embed(self) -> bool {
        matches!(
            self,
            BlockKind::EmbedFigma
                | BlockKind::EmbedMiro
                | BlockKind::EmbedGoogleDrive
                | BlockKind::EmbedTrello
                | BlockKind::EmbedLoom
                | BlockKind::EmbedBookmark
        )
    }

    /// Kinds whose text is typed character by character.
    pub fn is_text_family(self) -> bool {
        matches!(
            self,
            BlockKind::Title
                | BlockKind::Text
                | BlockKind::HeadingOne
                | BlockKind::HeadingTwo
                | BlockKind::HeadingThree
                | BlockKind::BulletList
                | BlockKind::NumberedList
                | BlockKind::ToggleList
                | BlockKind::CheckList
                | BlockKind::Banner
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 4] = [
        InlineStyle::Bold,
        InlineStyle::Italic,
        InlineStyle::Underline,
        InlineStyle::Strikethrough,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct InlineStyles {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
}

impl InlineStyles {
    pub fn contains(&self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.bold,
            InlineStyle::Italic => self.italic,
            InlineStyle::Underline => self.underline,
            InlineStyle::Strikethrough => self.strikethrough,
        }
    }

    pub fn with(mut self, style: InlineStyle, on: bool) -> Self {
        match style {
            InlineStyle::Bold => self.bold = on,
            InlineStyle::Italic => self.italic = on,
            InlineStyle::Underline => self.underline = on,
            InlineStyle::Strikethrough => self.strikethrough = on,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = InlineStyle> + '_ {
        InlineStyle::ALL
            .into_iter()
            .filter(move |style| self.contains(*style))
    }
}

/// Per-character metadata: inline style markers and an optional entity reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharacterMeta {
    pub styles: InlineStyles,
    pub entity: Option<EntityKey>,
}

impl CharacterMeta {
    pub fn with_entity(self, entity: Option<EntityKey>) -> Self {
        Self { entity, ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    key: BlockKey,
    kind: BlockKind,
    text: String,
    characters: Vec<CharacterMeta>,
    depth: usize,
    data: BlockData,
}

impl Block {
    pub fn new(key: impl Into<BlockKey>, kind: BlockKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let characters = vec![CharacterMeta::default(); text.chars().count()];
        Self {
            key: key.into(),
            kind,
            text,
            characters,
            depth: 0,
            data: BlockData::new(),
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }

    pub fn with_data_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_key(mut self, key: BlockKey) -> Self {
        self.key = key;
        self
    }

    /// Replaces the text together with its character metadata.
    ///
    /// Panics when `characters` does not hold exactly one entry per char of `text`.
    pub fn with_characters(mut self, text: String, characters: Vec<CharacterMeta>) -> Self {
        assert_eq!(
            text.chars().count(),
            characters.len(),
            "character metadata out of sync with text of block {}",
            self.key
        );
        self.text = text;
        self.characters = characters;
        self
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn characters(&self) -> &[CharacterMeta] {
        &self.characters
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn data(&self) -> &BlockData {
        &self.data
    }

    pub fn data_bool(&self, key: &str) -> bool {
        self.data.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.characters.get(offset).and_then(|c| c.entity)
    }

    pub fn styles_at(&self, offset: usize) -> InlineStyles {
        self.characters
            .get(offset)
            .map(|c| c.styles)
            .unwrap_or_default()
    }

    /// The entity backing an atomic block or a confirmed embed.
    pub fn block_entity(&self) -> Option<EntityKey> {
        self.characters.first().and_then(|c| c.entity)
    }

    pub fn is_editable(&self) -> bool {
        if self.kind.is_embed() {
            return !self.data_bool("isDisable");
        }
        self.kind.is_text_family()
    }

    pub fn slice(&self, range: Range<usize>) -> (String, Vec<CharacterMeta>) {
        let start = range.start.min(self.len());
        let end = range.end.clamp(start, self.len());
        let text = self.text.chars().skip(start).take(end - start).collect();
        (text, self.characters[start..end].to_vec())
    }

    /// Replaces `range` (in chars) with the given text and metadata, keeping key, kind,
    /// depth and data.
    pub(crate) fn splice(
        &self,
        range: Range<usize>,
        text: &str,
        characters: &[CharacterMeta],
    ) -> Block {
        let start = range.start.min(self.len());
        let end = range.end.clamp(start, self.len());
        let (head, head_chars) = self.slice(0..start);
        let (tail, tail_chars) = self.slice(end..self.len());

        let mut next_text = head;
        next_text.push_str(text);
        next_text.push_str(&tail);

        let mut next_chars = head_chars;
        next_chars.extend_from_slice(characters);
        next_chars.extend(tail_chars);

        self.clone().with_characters(next_text, next_chars)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPatch {
    #[serde(default)]
    pub set: BlockData,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl DataPatch {
    pub fn set(key: impl Into<String>, value: Value) -> Self {
        Self::default().and_set(key, value)
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::default().and_remove(key)
    }

    pub fn and_set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set.insert(key.into(), value);
        self
    }

    pub fn and_remove(mut self, key: impl Into<String>) -> Self {
        self.remove.push(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    pub(crate) fn apply_to(&self, data: &mut BlockData) {
        for (k, v) in &self.set {
            data.insert(k.clone(), v.clone());
        }
        for key in &self.remove {
            data.remove(key);
        }
    }
}

/// The versioned document: ordered blocks plus the entity table.
///
/// Blocks and the entity table are shared between snapshots; every write goes through a
/// fresh `Arc` so previously pushed states never observe later edits.
#[derive(Debug, Clone)]
pub struct ContentModel {
    blocks: Vec<Arc<Block>>,
    entities: Arc<EntityMap>,
    key_seq: u64,
}

impl PartialEq for ContentModel {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks && self.entities == other.entities
    }
}

impl ContentModel {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self::with_entities(blocks, EntityMap::default())
    }

    pub fn with_entities(blocks: Vec<Block>, entities: EntityMap) -> Self {
        Self {
            blocks: blocks.into_iter().map(Arc::new).collect(),
            entities: Arc::new(entities),
            key_seq: 0,
        }
    }

    /// A document holding a single empty title block.
    pub fn empty() -> Self {
        let mut content = Self::new(Vec::new());
        let key = content.generate_key();
        content.insert_block(0, Block::new(key, BlockKind::Title, ""));
        content
    }

    pub fn blocks(&self) -> impl DoubleEndedIterator<Item = &Block> + ExactSizeIterator + '_ {
        self.blocks.iter().map(|b| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, key: &BlockKey) -> Option<&Block> {
        self.index_of(key).map(|ix| self.blocks[ix].as_ref())
    }

    pub fn block_at(&self, ix: usize) -> Option<&Block> {
        self.blocks.get(ix).map(|b| b.as_ref())
    }

    pub fn index_of(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| b.key() == key)
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.block_at(0)
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last().map(|b| b.as_ref())
    }

    pub fn block_before(&self, key: &BlockKey) -> Option<&Block> {
        let ix = self.index_of(key)?;
        ix.checked_sub(1).and_then(|ix| self.block_at(ix))
    }

    pub fn block_after(&self, key: &BlockKey) -> Option<&Block> {
        let ix = self.index_of(key)?;
        self.block_at(ix + 1)
    }

    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Whether `other` holds the same allocation for `key`, i.e. the block was never rewritten.
    pub fn shares_block(&self, other: &ContentModel, key: &BlockKey) -> bool {
        match (self.index_of(key), other.index_of(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(&self.blocks[a], &other.blocks[b]),
            _ => false,
        }
    }

    /// Resolves a block key that the caller guarantees exists.
    ///
    /// Panics on unknown keys: a stale key reaching a primitive is a caller bug.
    pub(crate) fn expect_index(&self, key: &BlockKey) -> usize {
        match self.index_of(key) {
            Some(ix) => ix,
            None => panic!("unknown block key `{key}`"),
        }
    }

    pub(crate) fn generate_key(&mut self) -> BlockKey {
        loop {
            self.key_seq += 1;
            let candidate = BlockKey(format!("b{:x}", self.key_seq));
            if self.index_of(&candidate).is_none() {
                return candidate;
            }
        }
    }

    pub(crate) fn replace_block(&mut self, ix: usize, block: Block) {
        self.blocks[ix] = Arc::new(block);
    }

    pub(crate) fn insert_block(&mut self, ix: usize, block: Block) {
        self.blocks.insert(ix, Arc::new(block));
    }

    pub(crate) fn remove_block_at(&mut self, ix: usize) -> Arc<Block> {
        self.blocks.remove(ix)
    }

    pub(crate) fn entities_mut(&mut self) -> &mut EntityMap {
        Arc::make_mut(&mut self.entities)
    }

    /// Drops entities no character references any more.
    pub(crate) fn prune_entities(&mut self) {
        let referenced: Vec<EntityKey> = self
            .blocks
            .iter()
            .flat_map(|b| b.characters().iter().filter_map(|c| c.entity))
            .collect();
        let stale: Vec<EntityKey> = self
            .entities
            .keys()
            .filter(|key| !referenced.contains(key))
            .collect();
        if stale.is_empty() {
            return;
        }
        let entities = self.entities_mut();
        for key in stale {
            entities.remove(key);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub key: BlockKey,
    pub offset: usize,
}

impl Point {
    pub fn new(key: BlockKey, offset: usize) -> Self {
        Self { key, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn caret(key: BlockKey, offset: usize) -> Self {
        Self::collapsed(Point::new(key, offset))
    }

    pub fn range(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Start and end points in document order.
    pub fn ordered(&self, content: &ContentModel) -> (Point, Point) {
        let a = content.index_of(&self.anchor.key).unwrap_or(0);
        let f = content.index_of(&self.focus.key).unwrap_or(0);
        if (a, self.anchor.offset) <= (f, self.focus.offset) {
            (self.anchor.clone(), self.focus.clone())
        } else {
            (self.focus.clone(), self.anchor.clone())
        }
    }
}

/// Tags a state transition so observers can react to the kinds of change they care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    InsertCharacters,
    RemoveRange,
    BackspaceCharacter,
    SplitBlock,
    ChangeBlockType,
    ChangeBlockData,
    AdjustDepth,
    ApplyEntity,
    RemoveEntity,
    ChangeEntityData,
    ChangeInlineStyle,
    InsertFragment,
    MoveBlock,
    RemoveBlock,
    MergeBlocks,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::InsertCharacters => "insert-characters",
            ChangeKind::RemoveRange => "remove-range",
            ChangeKind::BackspaceCharacter => "backspace-character",
            ChangeKind::SplitBlock => "split-block",
            ChangeKind::ChangeBlockType => "change-block-type",
            ChangeKind::ChangeBlockData => "change-block-data",
            ChangeKind::AdjustDepth => "adjust-depth",
            ChangeKind::ApplyEntity => "apply-entity",
            ChangeKind::RemoveEntity => "remove-entity",
            ChangeKind::ChangeEntityData => "change-entity-data",
            ChangeKind::ChangeInlineStyle => "change-inline-style",
            ChangeKind::InsertFragment => "insert-fragment",
            ChangeKind::MoveBlock => "move-block",
            ChangeKind::RemoveBlock => "remove-block",
            ChangeKind::MergeBlocks => "merge-blocks",
        }
    }

    /// Changes that can alter block text.
    pub fn touches_text(self) -> bool {
        matches!(
            self,
            ChangeKind::InsertCharacters
                | ChangeKind::RemoveRange
                | ChangeKind::BackspaceCharacter
                | ChangeKind::SplitBlock
                | ChangeKind::MergeBlocks
                | ChangeKind::RemoveBlock
                | ChangeKind::MoveBlock
                | ChangeKind::ChangeBlockType
                | ChangeKind::InsertFragment
        )
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally observable editing unit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    content: ContentModel,
    selection: Selection,
    last_change: Option<ChangeKind>,
}

impl EditorState {
    pub fn new(content: ContentModel, selection: Selection) -> Self {
        let selection = clamp_selection(&content, selection);
        Self {
            content,
            selection,
            last_change: None,
        }
    }

    /// A state with the caret at the end of the first block.
    pub fn create(content: ContentModel) -> Self {
        let selection = match content.first_block() {
            Some(block) => Selection::caret(block.key().clone(), block.len()),
            None => Selection::caret(BlockKey::new(""), 0),
        };
        Self::new(content, selection)
    }

    pub fn content(&self) -> &ContentModel {
        &self.content
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn last_change(&self) -> Option<ChangeKind> {
        self.last_change
    }

    pub fn push(&self, content: ContentModel, change: ChangeKind) -> EditorState {
        self.push_with_selection(content, self.selection.clone(), change)
    }

    pub fn push_with_selection(
        &self,
        content: ContentModel,
        selection: Selection,
        change: ChangeKind,
    ) -> EditorState {
        tracing::trace!(change = change.as_str(), blocks = content.len(), "push");
        let selection = clamp_selection(&content, selection);
        EditorState {
            content,
            selection,
            last_change: Some(change),
        }
    }

    /// Replaces the content as part of the current transition, keeping its change tag.
    pub fn amend(&self, content: ContentModel) -> EditorState {
        let selection = clamp_selection(&content, self.selection.clone());
        EditorState {
            content,
            selection,
            last_change: self.last_change,
        }
    }

    pub fn with_selection(&self, selection: Selection) -> EditorState {
        EditorState {
            content: self.content.clone(),
            selection: clamp_selection(&self.content, selection),
            last_change: self.last_change,
        }
    }

    /// Folds a follow-up state into the transition that produced `self`.
    pub(crate) fn retag(mut self, change: Option<ChangeKind>) -> EditorState {
        self.last_change = change;
        self
    }
}

fn clamp_point(content: &ContentModel, point: Point) -> Option<Point> {
    let block = content.block(&point.key)?;
    Some(Point {
        offset: point.offset.min(block.len()),
        key: point.key,
    })
}

fn clamp_selection(content: &ContentModel, selection: Selection) -> Selection {
    let fallback = || match content.first_block() {
        Some(block) => Point::new(block.key().clone(), 0),
        None => Point::new(BlockKey::new(""), 0),
    };
    let anchor = clamp_point(content, selection.anchor).unwrap_or_else(fallback);
    let focus = clamp_point(content, selection.focus).unwrap_or_else(|| anchor.clone());
    Selection { anchor, focus }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
