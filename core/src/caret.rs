//! Caret position estimation by layout mirroring.
//!
//! Host text controls expose the caret as a character offset but not as a
//! pixel position. The estimator rebuilds the control's layout on an
//! off-screen [`MeasuringSurface`] that copies the widget's typography, box
//! model and wrapping mode, places the text before the offset followed by a
//! marker holding the rest of the text, and reports the marker's offset
//! within the surface (relative to its padding edge, like `offsetTop` /
//! `offsetLeft`).
//!
//! A surface is single-use: it is mounted for one measurement and unmounted
//! when dropped, so every exit path (including errors) tears it down.

use crate::word;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use thiserror::Error;
use unicode_width::UnicodeWidthChar;

/// Text used for the marker when the caret is at the end of the text, so the
/// marker still has a box to measure.
const MARKER_FALLBACK: &str = ".";

/// CSS default tab stop, in space advances.
const TAB_SIZE: f32 = 8.0;

/// Multiplier applied to the font size for `line-height: normal`.
const NORMAL_LINE_HEIGHT: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("invalid widget metrics: {0}")]
    InvalidMetrics(String),
    #[error("no glyph metrics for {0:?}")]
    Glyph(char),
}

/// Pixel offset of the caret inside the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaretPosition {
    pub top: f32,
    pub left: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    pub size_px: f32,
    pub weight: u16,
    pub letter_spacing_px: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size_px: 18.0,
            weight: 400,
            letter_spacing_px: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineHeight {
    Normal,
    Px(f32),
    Multiple(f32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeInsets {
    pub fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    ContentBox,
    BorderBox,
}

/// Whitespace handling. Both modes preserve spaces and newlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteSpace {
    /// No soft wrapping
    Pre,
    /// Soft wrap at whitespace; trailing spaces hang past the edge
    PreWrap,
}

/// Whether a word wider than the line may be broken between characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordWrap {
    Normal,
    BreakWord,
}

/// Computed style and geometry of the host text control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetMetrics {
    pub font: FontSpec,
    pub line_height: LineHeight,
    pub padding: EdgeInsets,
    pub border: EdgeInsets,
    pub box_sizing: BoxSizing,
    pub white_space: WhiteSpace,
    pub word_wrap: WordWrap,
    /// Rendered (border-box) width in pixels
    pub width: f32,
}

impl Default for WidgetMetrics {
    /// A full-width textarea with 18px text, 28px lines, 16px padding and a
    /// 1px border.
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            line_height: LineHeight::Px(28.0),
            padding: EdgeInsets::uniform(16.0),
            border: EdgeInsets::uniform(1.0),
            box_sizing: BoxSizing::BorderBox,
            white_space: WhiteSpace::PreWrap,
            word_wrap: WordWrap::BreakWord,
            width: 640.0,
        }
    }
}

impl WidgetMetrics {
    /// Resolved line height in pixels.
    pub fn line_height_px(&self) -> f32 {
        match self.line_height {
            LineHeight::Normal => self.font.size_px * NORMAL_LINE_HEIGHT,
            LineHeight::Px(px) => px,
            LineHeight::Multiple(m) => self.font.size_px * m,
        }
    }

    fn validate(&self) -> Result<(), MeasureError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.font.size_px) {
            return Err(MeasureError::InvalidMetrics(format!(
                "font size {}",
                self.font.size_px
            )));
        }
        if !positive(self.line_height_px()) {
            return Err(MeasureError::InvalidMetrics(format!(
                "line height {}",
                self.line_height_px()
            )));
        }
        if !self.width.is_finite() || self.width < 0.0 {
            return Err(MeasureError::InvalidMetrics(format!("width {}", self.width)));
        }
        Ok(())
    }
}

/// Per-character advance widths.
pub trait GlyphMetrics {
    fn advance(&self, ch: char, font: &FontSpec) -> Result<f32, MeasureError>;
}

/// Advance = display cells × `cell_em` × font size.
///
/// Cell counts come from `unicode-width`, so combining marks (viramas, vowel
/// signs) take no space and wide characters take two cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_em: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self { cell_em: 0.6 }
    }
}

impl GlyphMetrics for CellMetrics {
    fn advance(&self, ch: char, font: &FontSpec) -> Result<f32, MeasureError> {
        let cell = self.cell_em * font.size_px;
        if ch == '\t' {
            return Ok(cell * TAB_SIZE);
        }
        match ch.width().unwrap_or(0) {
            0 => Ok(0.0),
            cells => Ok(cells as f32 * cell + font.letter_spacing_px),
        }
    }
}

/// Something that can turn a character offset into caret pixels.
pub trait CaretEstimator {
    fn estimate(
        &self,
        metrics: &WidgetMetrics,
        value: &str,
        offset: usize,
    ) -> Result<CaretPosition, MeasureError>;
}

/// Off-screen copy of the widget used for a single measurement.
///
/// Created by [`MeasuringSurface::mount`]; unmounted on drop.
pub struct MeasuringSurface<'a> {
    mounted: &'a Cell<usize>,
    style: WidgetMetrics,
    /// Width of the content box
    content_width: f32,
    /// Text before the caret followed by the marker text
    content: String,
    /// Character index where the marker starts
    marker_start: usize,
}

impl<'a> MeasuringSurface<'a> {
    /// Mount a surface mirroring `metrics` with `value` split at `offset`.
    pub fn mount(
        mounted: &'a Cell<usize>,
        metrics: &WidgetMetrics,
        value: &str,
        offset: usize,
    ) -> Result<Self, MeasureError> {
        mounted.set(mounted.get() + 1);
        let mut surface = Self {
            mounted,
            style: metrics.clone(),
            content_width: 0.0,
            content: String::new(),
            marker_start: 0,
        };

        surface.style.validate()?;

        // Size the mirror so its border box matches the widget's rendered width
        let chrome = surface.style.padding.horizontal() + surface.style.border.horizontal();
        let declared_width = match surface.style.box_sizing {
            BoxSizing::BorderBox => surface.style.width,
            BoxSizing::ContentBox => surface.style.width - chrome,
        };
        surface.content_width = match surface.style.box_sizing {
            BoxSizing::BorderBox => declared_width - chrome,
            BoxSizing::ContentBox => declared_width,
        };
        if surface.content_width <= 0.0 {
            return Err(MeasureError::InvalidMetrics(format!(
                "no room for text: content width {}",
                surface.content_width
            )));
        }

        let split = word::byte_index(value, offset);
        let (before, rest) = value.split_at(split);
        let marker = if rest.is_empty() { MARKER_FALLBACK } else { rest };
        surface.marker_start = word::char_len(before);
        surface.content = format!("{before}{marker}");
        Ok(surface)
    }

    /// Lay out the content and return the marker's top-left corner.
    pub fn marker_position<G: GlyphMetrics + ?Sized>(
        &self,
        glyphs: &G,
    ) -> Result<CaretPosition, MeasureError> {
        let (line, x) = self.locate(glyphs)?;
        Ok(CaretPosition {
            top: self.style.padding.top + line as f32 * self.style.line_height_px(),
            left: self.style.padding.left + x,
        })
    }

    /// Line index and x offset of the marker's first character.
    fn locate<G: GlyphMetrics + ?Sized>(&self, glyphs: &G) -> Result<(usize, f32), MeasureError> {
        let font = &self.style.font;
        let soft_wrap = self.style.white_space == WhiteSpace::PreWrap;
        let break_word = self.style.word_wrap == WordWrap::BreakWord;
        let width = self.content_width;

        let chars: Vec<char> = self.content.chars().collect();
        let mut line = 0usize;
        let mut x = 0.0f32;
        let mut i = 0usize;

        while i < chars.len() {
            let ch = chars[i];

            if ch == '\n' {
                if i == self.marker_start {
                    return Ok((line, x));
                }
                line += 1;
                x = 0.0;
                i += 1;
                continue;
            }

            if word::is_separator(ch) {
                // Preserved spaces never trigger a wrap; they hang at the edge
                if i == self.marker_start {
                    return Ok((line, x));
                }
                x += glyphs.advance(ch, font)?;
                i += 1;
                continue;
            }

            // A word: the maximal run of non-separator characters
            let end = chars[i..]
                .iter()
                .position(|c| word::is_separator(*c))
                .map_or(chars.len(), |p| i + p);
            let mut advances = Vec::with_capacity(end - i);
            for &c in &chars[i..end] {
                advances.push(glyphs.advance(c, font)?);
            }
            let word_width: f32 = advances.iter().sum();

            if soft_wrap && x > 0.0 && x + word_width > width {
                line += 1;
                x = 0.0;
            }

            let breakable = soft_wrap && break_word && word_width > width;
            for (k, adv) in advances.into_iter().enumerate() {
                if breakable && x > 0.0 && x + adv > width {
                    line += 1;
                    x = 0.0;
                }
                if i + k == self.marker_start {
                    return Ok((line, x));
                }
                x += adv;
            }
            i = end;
        }

        // The marker always has at least one character, so this is only
        // reached for an offset past the content.
        Ok((line, x))
    }
}

impl Drop for MeasuringSurface<'_> {
    fn drop(&mut self) {
        self.mounted.set(self.mounted.get().saturating_sub(1));
    }
}

/// Estimator that mirrors the widget layout on a fresh surface per call.
#[derive(Debug)]
pub struct MirrorEstimator<G = CellMetrics> {
    glyphs: G,
    mounted: Cell<usize>,
}

impl<G: GlyphMetrics> MirrorEstimator<G> {
    pub fn new(glyphs: G) -> Self {
        Self {
            glyphs,
            mounted: Cell::new(0),
        }
    }

    /// Surfaces currently mounted (0 whenever no measurement is running).
    pub fn mounted_surfaces(&self) -> usize {
        self.mounted.get()
    }
}

impl Default for MirrorEstimator<CellMetrics> {
    fn default() -> Self {
        Self::new(CellMetrics::default())
    }
}

impl<G: GlyphMetrics> CaretEstimator for MirrorEstimator<G> {
    fn estimate(
        &self,
        metrics: &WidgetMetrics,
        value: &str,
        offset: usize,
    ) -> Result<CaretPosition, MeasureError> {
        let surface = MeasuringSurface::mount(&self.mounted, metrics, value, offset)?;
        surface.marker_position(&self.glyphs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every visible character is 10px wide, no padding, 20px lines.
    fn grid(width: f32) -> WidgetMetrics {
        WidgetMetrics {
            font: FontSpec {
                size_px: 10.0,
                ..FontSpec::default()
            },
            line_height: LineHeight::Px(20.0),
            padding: EdgeInsets::default(),
            border: EdgeInsets::default(),
            box_sizing: BoxSizing::BorderBox,
            white_space: WhiteSpace::PreWrap,
            word_wrap: WordWrap::BreakWord,
            width,
        }
    }

    fn estimator() -> MirrorEstimator {
        MirrorEstimator::new(CellMetrics { cell_em: 1.0 })
    }

    #[test]
    fn test_default_estimator_uses_cell_metrics() {
        let e = MirrorEstimator::default();
        let explicit = MirrorEstimator::new(CellMetrics::default());
        let m = grid(200.0);
        let caret = e.estimate(&m, "ab", 2).unwrap();
        assert_eq!(caret, explicit.estimate(&m, "ab", 2).unwrap());
        assert!(caret.left > 0.0);
        assert_eq!(e.mounted_surfaces(), 0);
    }

    fn pos(top: f32, left: f32) -> CaretPosition {
        CaretPosition { top, left }
    }

    #[test]
    fn test_single_line_offsets() {
        let e = estimator();
        let m = grid(200.0);
        assert_eq!(e.estimate(&m, "hello", 0).unwrap(), pos(0.0, 0.0));
        assert_eq!(e.estimate(&m, "hello", 3).unwrap(), pos(0.0, 30.0));
        // End of text measures the fallback marker
        assert_eq!(e.estimate(&m, "hello", 5).unwrap(), pos(0.0, 50.0));
    }

    #[test]
    fn test_padding_shifts_origin() {
        let e = estimator();
        let mut m = grid(200.0);
        m.padding = EdgeInsets::uniform(16.0);
        assert_eq!(e.estimate(&m, "ab", 1).unwrap(), pos(16.0, 26.0));
    }

    #[test]
    fn test_hard_newlines() {
        let e = estimator();
        let m = grid(200.0);
        assert_eq!(e.estimate(&m, "ab\ncd", 4).unwrap(), pos(20.0, 10.0));
        assert_eq!(e.estimate(&m, "ab\n", 3).unwrap(), pos(20.0, 0.0));
    }

    #[test]
    fn test_soft_wrap_moves_whole_word() {
        let e = estimator();
        // 10 characters fit per line
        let m = grid(100.0);
        // "hello " fills 6 cells, "world" (5) does not fit in the remaining 4
        assert_eq!(e.estimate(&m, "hello world", 8).unwrap(), pos(20.0, 20.0));
        // Caret right after the space: the marker starts the wrapped word
        assert_eq!(e.estimate(&m, "hello world", 6).unwrap(), pos(20.0, 0.0));
    }

    #[test]
    fn test_trailing_spaces_hang() {
        let e = estimator();
        let m = grid(50.0);
        // "abcde" fills the line; the space hangs past the edge
        assert_eq!(e.estimate(&m, "abcde f", 5).unwrap(), pos(0.0, 50.0));
    }

    #[test]
    fn test_break_word_splits_long_words() {
        let e = estimator();
        let m = grid(40.0);
        assert_eq!(e.estimate(&m, "abcdefghij", 6).unwrap(), pos(20.0, 20.0));

        let mut no_break = grid(40.0);
        no_break.word_wrap = WordWrap::Normal;
        assert_eq!(e.estimate(&no_break, "abcdefghij", 6).unwrap(), pos(0.0, 60.0));
    }

    #[test]
    fn test_pre_never_soft_wraps() {
        let e = estimator();
        let mut m = grid(30.0);
        m.white_space = WhiteSpace::Pre;
        assert_eq!(e.estimate(&m, "aaa bbb", 6).unwrap(), pos(0.0, 60.0));
    }

    #[test]
    fn test_combining_marks_take_no_space() {
        let e = estimator();
        let m = grid(200.0);
        // న మ ్ మ : the virama has zero advance
        assert_eq!(e.estimate(&m, "నమ్మ", 4).unwrap(), pos(0.0, 30.0));
    }

    #[test]
    fn test_box_sizing_mirrors_rendered_width() {
        let e = estimator();
        let mut border_box = grid(72.0);
        border_box.padding = EdgeInsets::uniform(10.0);
        border_box.border = EdgeInsets::uniform(1.0);
        let mut content_box = border_box.clone();
        content_box.box_sizing = BoxSizing::ContentBox;

        let text = "aaaa bbbb";
        for offset in 0..=9 {
            assert_eq!(
                e.estimate(&border_box, text, offset).unwrap(),
                e.estimate(&content_box, text, offset).unwrap()
            );
        }
        // Content width is 50: "bbbb" wraps
        assert_eq!(e.estimate(&border_box, text, 7).unwrap(), pos(30.0, 30.0));
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let e = MirrorEstimator::new(CellMetrics::default());
        let m = WidgetMetrics::default();
        let text = "నమస్తే, how are you today? this line is long enough to wrap once or twice";
        let first = e.estimate(&m, text, 40).unwrap();
        let second = e.estimate(&m, text, 40).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_offset_is_clamped() {
        let e = estimator();
        let m = grid(200.0);
        assert_eq!(
            e.estimate(&m, "abc", 99).unwrap(),
            e.estimate(&m, "abc", 3).unwrap()
        );
    }

    #[test]
    fn test_surface_unmounted_on_success_and_error() {
        let e = estimator();
        e.estimate(&grid(100.0), "abc", 1).unwrap();
        assert_eq!(e.mounted_surfaces(), 0);

        let mut bad = grid(100.0);
        bad.font.size_px = 0.0;
        assert!(matches!(
            e.estimate(&bad, "abc", 1),
            Err(MeasureError::InvalidMetrics(_))
        ));
        assert_eq!(e.mounted_surfaces(), 0);

        // Padding wider than the widget leaves no content box
        let mut cramped = grid(10.0);
        cramped.padding = EdgeInsets::uniform(8.0);
        assert!(e.estimate(&cramped, "abc", 1).is_err());
        assert_eq!(e.mounted_surfaces(), 0);
    }

    struct NoGlyphFor(char);

    impl GlyphMetrics for NoGlyphFor {
        fn advance(&self, ch: char, _font: &FontSpec) -> Result<f32, MeasureError> {
            if ch == self.0 {
                Err(MeasureError::Glyph(ch))
            } else {
                Ok(10.0)
            }
        }
    }

    #[test]
    fn test_glyph_failure_unmounts_surface() {
        let e = MirrorEstimator::new(NoGlyphFor('x'));
        let m = grid(100.0);
        assert_eq!(e.estimate(&m, "abxc", 3), Err(MeasureError::Glyph('x')));
        assert_eq!(e.mounted_surfaces(), 0);
        assert_eq!(e.estimate(&m, "abc", 2).unwrap(), pos(0.0, 20.0));
    }

    #[test]
    fn test_metrics_deserialize_from_toml_fragment() {
        let m: WidgetMetrics = toml::from_str(
            r#"
            width = 320.0
            box_sizing = "content-box"
            line_height = { px = 24.0 }
            [font]
            size_px = 16.0
            "#,
        )
        .unwrap();
        assert_eq!(m.width, 320.0);
        assert_eq!(m.box_sizing, BoxSizing::ContentBox);
        assert_eq!(m.line_height_px(), 24.0);
        assert_eq!(m.font.family, "sans-serif");
    }
}
