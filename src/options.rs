//! Page-layout options and the mapping to engine-native parameters.
//!
//! [`LayoutOptions`] is the abstract, caller-supplied page setup.
//! [`map_layout_options`] is a pure function translating it into
//! [`NativeRenderOptions`], the engine-shaped parameter set (a named paper
//! format XOR explicit millimetre dimensions, mm-string margins, landscape
//! flag, page ranges). [`NativeRenderOptions::to_cdp`] converts that into
//! the `Page.printToPDF` call shape, which measures paper in inches.
//!
//! # Mapping rules
//!
//! - Background graphics are always printed; the engine's native
//!   header/footer mechanism is always suppressed (headers and footers,
//!   when needed, are composited into the page content upstream).
//! - `Custom` page size always overrides a named format: the native options
//!   then carry explicit width/height and no format at all.
//! - Margins default to `0mm` per side.
//! - The page-range string passes through verbatim; empty means all pages.

use headless_chrome::types::PrintToPdfOptions;
use serde::{Deserialize, Serialize};

/// Millimetres per inch, for the CDP conversion.
const MM_PER_INCH: f64 = 25.4;

/// Default custom page dimensions (mm) when the caller picked `Custom`
/// without supplying both sides. A4 portrait.
const DEFAULT_CUSTOM_WIDTH_MM: f64 = 210.0;
const DEFAULT_CUSTOM_HEIGHT_MM: f64 = 297.0;

// ============================================================================
// Caller-facing types
// ============================================================================

/// Named page formats, plus `Custom` for explicit dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// 210 × 297 mm. The default.
    #[default]
    A4,
    /// 297 × 420 mm.
    A3,
    /// 148 × 210 mm.
    A5,
    /// 8.5 × 11 in.
    Letter,
    /// 8.5 × 14 in.
    Legal,
    /// 11 × 17 in.
    Tabloid,
    /// 17 × 11 in.
    Ledger,
    /// Explicit width/height from [`LayoutOptions`].
    Custom,
}

impl PageSize {
    /// Paper dimensions in millimetres; `None` for [`Custom`](Self::Custom).
    pub fn dimensions_mm(self) -> Option<(f64, f64)> {
        match self {
            PageSize::A4 => Some((210.0, 297.0)),
            PageSize::A3 => Some((297.0, 420.0)),
            PageSize::A5 => Some((148.0, 210.0)),
            PageSize::Letter => Some((215.9, 279.4)),
            PageSize::Legal => Some((215.9, 355.6)),
            PageSize::Tabloid => Some((279.4, 431.8)),
            PageSize::Ledger => Some((431.8, 279.4)),
            PageSize::Custom => None,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// The default.
    #[default]
    Portrait,
    /// Maps to the engine's landscape flag.
    Landscape,
}

/// Abstract, caller-supplied page setup for one render request.
///
/// Constructed fresh per request from caller input plus the per-print-format
/// stored orientation default; immutable after construction.
///
/// # Example
///
/// ```rust
/// use chromeprint::{LayoutOptions, PageSize, Orientation};
///
/// let options = LayoutOptions {
///     page_size: PageSize::A4,
///     orientation: Some(Orientation::Landscape),
///     ..Default::default()
/// };
/// assert!(chromeprint::map_layout_options(&options).landscape);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Named format, or [`PageSize::Custom`] with explicit dimensions.
    #[serde(default)]
    pub page_size: PageSize,

    /// `None` means the caller did not specify; the per-print-format stored
    /// default (if any) applies, else portrait.
    #[serde(default)]
    pub orientation: Option<Orientation>,

    /// Page width in millimetres. Only meaningful when `page_size` is
    /// `Custom`.
    #[serde(default)]
    pub page_width: Option<f64>,

    /// Page height in millimetres. Only meaningful when `page_size` is
    /// `Custom`.
    #[serde(default)]
    pub page_height: Option<f64>,

    /// Top margin in millimetres, default 0.
    #[serde(default)]
    pub margin_top: f64,
    /// Right margin in millimetres, default 0.
    #[serde(default)]
    pub margin_right: f64,
    /// Bottom margin in millimetres, default 0.
    #[serde(default)]
    pub margin_bottom: f64,
    /// Left margin in millimetres, default 0.
    #[serde(default)]
    pub margin_left: f64,

    /// Page range spec, e.g. `"1-3,5"`. Empty means all pages.
    #[serde(default)]
    pub page_ranges: String,
}

impl LayoutOptions {
    /// Effective orientation: explicit value, else portrait.
    pub fn effective_orientation(&self) -> Orientation {
        self.orientation.unwrap_or_default()
    }
}

// ============================================================================
// Engine-native options
// ============================================================================

/// Engine-native parameter set, produced by [`map_layout_options`].
///
/// Ephemeral: constructed per request, consumed once by the pipeline.
/// Exactly one of `format` and the `width`/`height` pair is present.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRenderOptions {
    /// Named paper format. `None` when explicit dimensions are used.
    pub format: Option<PageSize>,
    /// Explicit paper width as a mm string, e.g. `"150mm"`. Mutually
    /// exclusive with `format`.
    pub width: Option<String>,
    /// Explicit paper height as a mm string.
    pub height: Option<String>,
    /// Landscape flag.
    pub landscape: bool,
    /// Always true: background graphics are printed.
    pub print_background: bool,
    /// Always false: the engine's header/footer mechanism is suppressed.
    pub display_header_footer: bool,
    /// Always empty.
    pub header_template: String,
    /// Always empty.
    pub footer_template: String,
    /// Margins as mm strings, `"0mm"` when unset.
    pub margin_top: String,
    /// See `margin_top`.
    pub margin_right: String,
    /// See `margin_top`.
    pub margin_bottom: String,
    /// See `margin_top`.
    pub margin_left: String,
    /// Passed through verbatim; empty means all pages.
    pub page_ranges: String,
    /// Render scale, always 1.0.
    pub scale: f64,
    /// Always false: the mapped paper size wins over CSS `@page` size.
    pub prefer_css_page_size: bool,
}

/// Translate abstract layout options into the engine-native parameter set.
///
/// Pure: no side effects, no I/O, fully deterministic.
pub fn map_layout_options(options: &LayoutOptions) -> NativeRenderOptions {
    let landscape = options.effective_orientation() == Orientation::Landscape;

    let (format, width, height) = if options.page_size == PageSize::Custom {
        (
            None,
            Some(mm_string(options.page_width.unwrap_or(DEFAULT_CUSTOM_WIDTH_MM))),
            Some(mm_string(options.page_height.unwrap_or(DEFAULT_CUSTOM_HEIGHT_MM))),
        )
    } else {
        (Some(options.page_size), None, None)
    };

    NativeRenderOptions {
        format,
        width,
        height,
        landscape,
        print_background: true,
        display_header_footer: false,
        header_template: String::new(),
        footer_template: String::new(),
        margin_top: mm_string(options.margin_top),
        margin_right: mm_string(options.margin_right),
        margin_bottom: mm_string(options.margin_bottom),
        margin_left: mm_string(options.margin_left),
        page_ranges: options.page_ranges.clone(),
        scale: 1.0,
        prefer_css_page_size: false,
    }
}

impl NativeRenderOptions {
    /// Convert into the `Page.printToPDF` parameter shape.
    ///
    /// The protocol measures paper and margins in inches; named formats are
    /// resolved to their dimensions here, so the mutual exclusivity of
    /// `format` and `width`/`height` is preserved all the way down.
    pub fn to_cdp(&self) -> PrintToPdfOptions {
        let (paper_width, paper_height) = match self.format {
            Some(size) => {
                let (w, h) = size
                    .dimensions_mm()
                    .unwrap_or((DEFAULT_CUSTOM_WIDTH_MM, DEFAULT_CUSTOM_HEIGHT_MM));
                (Some(w / MM_PER_INCH), Some(h / MM_PER_INCH))
            }
            None => (
                self.width.as_deref().and_then(mm_string_to_inches),
                self.height.as_deref().and_then(mm_string_to_inches),
            ),
        };

        PrintToPdfOptions {
            landscape: Some(self.landscape),
            display_header_footer: Some(self.display_header_footer),
            print_background: Some(self.print_background),
            scale: Some(self.scale),
            paper_width,
            paper_height,
            margin_top: mm_string_to_inches(&self.margin_top),
            margin_right: mm_string_to_inches(&self.margin_right),
            margin_bottom: mm_string_to_inches(&self.margin_bottom),
            margin_left: mm_string_to_inches(&self.margin_left),
            page_ranges: if self.page_ranges.is_empty() {
                None
            } else {
                Some(self.page_ranges.clone())
            },
            header_template: None,
            footer_template: None,
            prefer_css_page_size: Some(self.prefer_css_page_size),
            ..Default::default()
        }
    }
}

fn mm_string(value: f64) -> String {
    format!("{}mm", value)
}

fn mm_string_to_inches(value: &str) -> Option<f64> {
    value
        .strip_suffix("mm")
        .and_then(|n| n.trim().parse::<f64>().ok())
        .map(|n| n / MM_PER_INCH)
}

// ============================================================================
// Unit Tests
// ============================================================================
