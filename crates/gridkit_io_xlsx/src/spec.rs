//! Shared sheet-composition models, options and errors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conf::N_ROWS_HEADER_OFFSET;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormat

/// 24-bit RGB color used for font and fill colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecHexColor(u32);

impl SpecHexColor {
    pub const DARK_BLUE: Self = Self(0xB8C6FF);
    pub const BLUE: Self = Self(0xD8E0FF);
    pub const LIGHT_BLUE: Self = Self(0xF1F4FF);
    pub const DARK_GREEN: Self = Self(0x236900);
    pub const PASTEL_GREEN: Self = Self(0xA9C37D);
    pub const LIGHT_PINK: Self = Self(0xFDD9FF);
    pub const RED: Self = Self(0xA83232);

    /// Build a color from `0xRRGGBB`; bits above 24 are dropped.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    /// Raw `0xRRGGBB` value.
    pub const fn rgb(self) -> u32 {
        self.0
    }

    /// `#RRGGBB` text form.
    pub fn to_hex(self) -> String {
        format!("#{:06X}", self.0)
    }
}

impl fmt::Display for SpecHexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SpecHexColor {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let c_hex = s.trim().trim_start_matches('#');
        if c_hex.len() != 6 || !c_hex.chars().all(|chr| chr.is_ascii_hexdigit()) {
            return Err(GridError::MalformedFormat(format!(
                "Invalid hex color: {s:?} (expected RRGGBB)."
            )));
        }
        u32::from_str_radix(c_hex, 16)
            .map(Self::from_rgb)
            .map_err(|err| GridError::MalformedFormat(format!("Invalid hex color {s:?}: {err}")))
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumTextAlign {
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterAcross,
    Distributed,
}

impl EnumTextAlign {
    /// Style-descriptor spelling (`left`, `center`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Fill => "fill",
            Self::Justify => "justify",
            Self::CenterAcross => "center_across",
            Self::Distributed => "distributed",
        }
    }
}

impl FromStr for EnumTextAlign {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "fill" => Ok(Self::Fill),
            "justify" => Ok(Self::Justify),
            "center_across" => Ok(Self::CenterAcross),
            "distributed" => Ok(Self::Distributed),
            _ => Err(GridError::MalformedFormat(format!(
                "Unknown text alignment: {s:?}"
            ))),
        }
    }
}

/// Visual styling for one cell.
///
/// Every attribute is optional and defaults to unset; unset attributes fall back
/// to the workbook engine defaults at write time and never override a set value
/// when formats are merged. Equality and hashing cover all five attributes, so
/// attribute-equal formats share one registered workbook style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font color.
    pub font_color: Option<SpecHexColor>,
    /// Font size in points; must be positive.
    pub font_size: Option<u32>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Background fill color.
    pub fill_color: Option<SpecHexColor>,
    /// Horizontal alignment.
    pub align: Option<EnumTextAlign>,
}

/// Scalar value for generic style-descriptor representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCellFormatValue {
    /// String style property value.
    String(String),
    /// Integer style property value.
    Integer(i64),
    /// Boolean style property value.
    Boolean(bool),
}

impl SpecCellFormat {
    pub fn with_font_color(mut self, color: SpecHexColor) -> Self {
        self.font_color = Some(color);
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_fill_color(mut self, color: SpecHexColor) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn with_align(mut self, align: EnumTextAlign) -> Self {
        self.align = Some(align);
        self
    }

    /// `true` when no attribute is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject values the workbook engine cannot represent.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.font_size == Some(0) {
            return Err(GridError::MalformedFormat(
                "font_size must be >= 1.".to_string(),
            ));
        }
        Ok(())
    }

    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        let mut fmt_merged = self.clone();
        fmt_merged.update(other);
        fmt_merged
    }

    /// In-place form of [`Self::merge`]: every attribute set in `other` wins.
    pub fn update(&mut self, other: &SpecCellFormat) {
        self.font_color = other.font_color.or(self.font_color);
        self.font_size = other.font_size.or(self.font_size);
        self.bold = other.bold.or(self.bold);
        self.fill_color = other.fill_color.or(self.fill_color);
        self.align = other.align.or(self.align);
    }

    /// Project into xlsxwriter-style property keys, omitting unset attributes.
    pub fn to_style_descriptor(&self) -> BTreeMap<String, EnumCellFormatValue> {
        let mut dict_fmt = BTreeMap::new();

        if let Some(value) = self.font_size {
            dict_fmt.insert(
                "font_size".to_string(),
                EnumCellFormatValue::Integer(i64::from(value)),
            );
        }
        if let Some(value) = self.bold {
            dict_fmt.insert("bold".to_string(), EnumCellFormatValue::Boolean(value));
        }
        if let Some(value) = self.align {
            dict_fmt.insert(
                "align".to_string(),
                EnumCellFormatValue::String(value.as_str().to_string()),
            );
        }
        if let Some(value) = self.font_color {
            dict_fmt.insert(
                "font_color".to_string(),
                EnumCellFormatValue::String(value.to_hex()),
            );
        }
        if let Some(value) = self.fill_color {
            dict_fmt.insert(
                "bg_color".to_string(),
                EnumCellFormatValue::String(value.to_hex()),
            );
        }

        dict_fmt
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Scalar held by a table body or a flattened sheet grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Missing, or a number that cannot be stored as a cell (`NaN`/`Inf`).
    pub fn is_missing(&self) -> bool {
        match self {
            Self::None => true,
            Self::Number(n) => !n.is_finite(),
            _ => false,
        }
    }

    /// Plain text rendering; missing and non-finite values render empty.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(s) => s.clone(),
            Self::Number(n) if !n.is_finite() => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Replacement text used when missing values are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for missing value.
    pub missing_value_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Column width inference policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 1,
            width_cell_max: 255,
            width_cell_padding: 8,
        }
    }
}

/// Label row written above the grid at physical row 0, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumHeaderLabels {
    /// Numeric positional labels `0`, `1`, `2`, ...
    #[default]
    Index,
    /// Leave row 0 empty.
    Blank,
    /// No label row: the grid starts at physical row 0.
    Omit,
}

impl EnumHeaderLabels {
    /// Physical rows reserved above the flattened grid.
    pub fn row_offset(self) -> usize {
        match self {
            Self::Index | Self::Blank => N_ROWS_HEADER_OFFSET,
            Self::Omit => 0,
        }
    }
}

/// Workbook export options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecXlsxExportOptions {
    /// Size every column to its widest rendered value.
    pub autofit_column_widths: bool,
    /// Width inference bounds and padding.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Label row content.
    pub header_labels: EnumHeaderLabels,
    /// Write missing/NaN/Inf as policy text instead of blanks.
    pub keep_missing_values: bool,
    /// Replacement text policy.
    pub value_policy: SpecXlsxValuePolicy,
}

impl Default for SpecXlsxExportOptions {
    fn default() -> Self {
        Self {
            autofit_column_widths: true,
            policy_autofit: SpecAutofitCellsPolicy::default(),
            header_labels: EnumHeaderLabels::Index,
            keep_missing_values: false,
            value_policy: SpecXlsxValuePolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Reports

/// Per-sheet export summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSheetReport {
    /// Worksheet name.
    pub sheet_name: String,
    /// Flattened grid height (excluding the label row).
    pub n_rows: usize,
    /// Flattened grid width.
    pub n_cols: usize,
    /// Cells handed to the workbook sink.
    pub n_cells_written: usize,
    /// Cells written with a style handle.
    pub n_cells_formatted: usize,
}

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets in write order.
    pub sheets: Vec<SpecSheetReport>,
    /// Distinct styles registered with the sink.
    pub n_styles: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors raised by the composition engine and the workbook exporter.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Coordinate already formatted and `exist_ok` was not set.
    #[error("Cell at ({row}, {col}) already has a format.")]
    DuplicateCellFormat { row: usize, col: usize },
    /// Sheet name already registered (Excel compares names case-insensitively).
    #[error("Sheet {0:?} already registered.")]
    DuplicateSheetName(String),
    /// Sheet name rejected by Excel naming rules.
    #[error("Invalid sheet name {name:?}: {reason}")]
    InvalidSheetName { name: String, reason: String },
    /// Destination extension not writable by this exporter.
    #[error("Unsupported destination: {} (expected .xlsx)", .0.display())]
    UnsupportedDestination(PathBuf),
    /// Invalid format attribute or color/alignment text.
    #[error("{0}")]
    MalformedFormat(String),
    /// Table body is not rectangular or cannot be decoded.
    #[error("Malformed table: {0}")]
    MalformedTable(String),
    /// Sheet exceeds worksheet limits.
    #[error("Sheet {sheet:?} is too large for a worksheet: {rows} rows x {cols} columns.")]
    SheetTooLarge {
        sheet: String,
        rows: usize,
        cols: usize,
    },
    /// Row/column index not representable by the workbook engine.
    #[error("{0}")]
    IndexOverflow(String),
    /// Workbook sink used after `close()`.
    #[error("Cannot write after close().")]
    SinkClosed,
    /// Workbook engine failure.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
