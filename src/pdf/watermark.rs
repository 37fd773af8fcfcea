// Text watermark stamping with lopdf.
//
// Every page gets its original content wrapped in a q/Q pair and a trailing
// content stream that draws the configured text, centred and rotated, in
// Helvetica with a translucent fill.

use super::{PDF_SIGNATURE, PdfError, StampedPdf, Watermarker};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// US Letter, used when neither the page nor its ancestors declare a MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];
const FONT_RESOURCE_BASE: &str = "WmFont";
const GSTATE_RESOURCE_BASE: &str = "WmGs";
/// Page tree depth guard against Parent cycles.
const MAX_TREE_DEPTH: usize = 64;
/// Helvetica cap height in text space units (per 1000).
const HELVETICA_CAP_HEIGHT: f32 = 718.0;

// Helvetica advance widths for 0x20..=0x7E, from the standard 14 font AFM.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const GRAY: RgbColor = RgbColor {
        r: 0x80,
        g: 0x80,
        b: 0x80,
    };

    fn components(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl FromStr for RgbColor {
    type Err = String;

    /// Parses `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "invalid color '{}': expected a hex triplet like #808080",
                s
            ));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid color '{}': {}", s, e))
        };

        Ok(RgbColor {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// What gets stamped on each page.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkConfig {
    pub text: String,
    /// Font size in points.
    pub font_size: f32,
    /// Fill alpha, in (0, 1].
    pub opacity: f32,
    /// Counter-clockwise rotation as seen by the reader, in degrees.
    pub rotation_degrees: f32,
    pub color: RgbColor,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "CONFIDENTIAL".to_string(),
            font_size: 48.0,
            opacity: 0.3,
            rotation_degrees: 45.0,
            color: RgbColor::GRAY,
        }
    }
}

impl WatermarkConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.text.is_empty() {
            return Err("watermark text must not be empty".to_string());
        }
        if let Some(c) = self.text.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(format!(
                "watermark text may only contain printable ASCII, found {:?}",
                c
            ));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(format!(
                "watermark font size must be positive, got {}",
                self.font_size
            ));
        }
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(format!(
                "watermark opacity must be in (0, 1], got {}",
                self.opacity
            ));
        }
        if !self.rotation_degrees.is_finite() {
            return Err("watermark rotation must be a finite number".to_string());
        }
        Ok(())
    }
}

/// Width of `text` set in Helvetica at `font_size`, in points.
pub fn helvetica_text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .bytes()
        .map(|b| match b {
            0x20..=0x7E => u32::from(HELVETICA_WIDTHS[usize::from(b - 0x20)]),
            _ => 556,
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// Text matrix `[a b c d e f]` placing a run of `width` x `cap_height`
/// centred on `center`, rotated by `angle_degrees`.
fn centered_text_matrix(
    center: (f32, f32),
    width: f32,
    cap_height: f32,
    angle_degrees: f32,
) -> [f32; 6] {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (cx, cy) = center;
    let half_w = width / 2.0;
    let half_h = cap_height / 2.0;

    [
        cos,
        sin,
        -sin,
        cos,
        cx - half_w * cos + half_h * sin,
        cy - half_w * sin - half_h * cos,
    ]
}

pub struct LopdfWatermarker {
    config: WatermarkConfig,
}

impl LopdfWatermarker {
    pub fn new(config: WatermarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    fn overlay_operations(
        &self,
        media_box: [f32; 4],
        page_rotation: i64,
        font_name: Vec<u8>,
        gstate_name: Vec<u8>,
        restore_page_state: bool,
    ) -> Vec<Operation> {
        let config = &self.config;
        let [r, g, b] = config.color.components();
        let center = (
            (media_box[0] + media_box[2]) / 2.0,
            (media_box[1] + media_box[3]) / 2.0,
        );
        // /Rotate turns the page clockwise on screen; add it back so the
        // reader sees the configured angle.
        let angle = config.rotation_degrees + page_rotation as f32;
        let matrix = centered_text_matrix(
            center,
            helvetica_text_width(&config.text, config.font_size),
            HELVETICA_CAP_HEIGHT * config.font_size / 1000.0,
            angle,
        );

        let mut operations = Vec::with_capacity(10);
        if restore_page_state {
            operations.push(Operation::new("Q", vec![]));
        }
        operations.extend([
            Operation::new("q", vec![]),
            Operation::new("gs", vec![Object::Name(gstate_name)]),
            Operation::new(
                "rg",
                vec![Object::Real(r), Object::Real(g), Object::Real(b)],
            ),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font_name), Object::Real(config.font_size)],
            ),
            Operation::new("Tm", matrix.into_iter().map(Object::Real).collect()),
            Operation::new("Tj", vec![Object::string_literal(config.text.as_str())]),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
        operations
    }
}

impl Watermarker for LopdfWatermarker {
    fn apply(&self, input: &[u8]) -> Result<StampedPdf, PdfError> {
        if !input.starts_with(PDF_SIGNATURE) {
            return Err(PdfError::NotAPdf);
        }

        let mut doc = Document::load_mem(input)?;
        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfError::NoPages);
        }

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let gstate_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(self.config.opacity),
            "CA" => Object::Real(self.config.opacity),
        });
        let save_state_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));

        for page_id in &page_ids {
            let page_id = *page_id;
            let media_box = page_media_box(&doc, page_id)?;
            let rotation = page_rotation(&doc, page_id)?;
            let existing = page_contents(&doc, page_id)?;

            let font_name =
                register_resource(&mut doc, page_id, b"Font", FONT_RESOURCE_BASE, font_id)?;
            let gstate_name = register_resource(
                &mut doc,
                page_id,
                b"ExtGState",
                GSTATE_RESOURCE_BASE,
                gstate_id,
            )?;

            let content = Content {
                operations: self.overlay_operations(
                    media_box,
                    rotation,
                    font_name,
                    gstate_name,
                    !existing.is_empty(),
                ),
            };
            let mut overlay = Stream::new(dictionary! {}, content.encode()?);
            overlay.compress()?;
            let overlay_id = doc.add_object(overlay);

            let mut contents = Vec::with_capacity(existing.len() + 2);
            if !existing.is_empty() {
                contents.push(Object::Reference(save_state_id));
                contents.extend(existing);
            }
            contents.push(Object::Reference(overlay_id));

            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Contents", Object::Array(contents));
        }

        debug!(
            "Stamped watermark {:?} on {} page(s)",
            self.config.text,
            page_ids.len()
        );

        let mut output = Vec::with_capacity(input.len() + 1024);
        doc.save_to(&mut output)?;
        Ok(StampedPdf {
            data: output,
            page_count: page_ids.len(),
        })
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, PdfError> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Looks up an inheritable page attribute, walking up the page tree.
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, PdfError> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(resolve(doc, value)?));
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => node = doc.get_dictionary(*parent_id)?,
            _ => return Ok(None),
        }
    }
    Err(PdfError::Malformed(format!(
        "page tree deeper than {} levels",
        MAX_TREE_DEPTH
    )))
}

fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], PdfError> {
    let Some(value) = inherited_attribute(doc, page_id, b"MediaBox")? else {
        return Ok(DEFAULT_MEDIA_BOX);
    };

    let items = value.as_array()?;
    if items.len() != 4 {
        return Err(PdfError::Malformed(format!(
            "MediaBox has {} entries, expected 4",
            items.len()
        )));
    }

    let mut rect = [0.0f32; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = resolve(doc, item)?.as_float()?;
    }

    Ok([
        rect[0].min(rect[2]),
        rect[1].min(rect[3]),
        rect[0].max(rect[2]),
        rect[1].max(rect[3]),
    ])
}

/// The page's /Rotate in degrees, normalized to 0..360. Integral reals are
/// accepted; anything else is treated as unrotated.
fn page_rotation(doc: &Document, page_id: ObjectId) -> Result<i64, PdfError> {
    let degrees = match inherited_attribute(doc, page_id, b"Rotate")? {
        Some(Object::Integer(value)) => *value,
        Some(Object::Real(value)) if value.is_finite() && value.fract() == 0.0 => *value as i64,
        Some(other) => {
            debug!("Ignoring unusable /Rotate value {:?}", other);
            0
        }
        None => 0,
    };
    Ok(degrees.rem_euclid(360))
}

/// The page's content stream references, flattened into a list.
fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, PdfError> {
    let page = doc.get_dictionary(page_id)?;
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => Ok(items.clone()),
            _ => Ok(vec![Object::Reference(*id)]),
        },
        Ok(Object::Array(items)) => Ok(items.clone()),
        Ok(_) => Err(PdfError::Malformed(
            "page Contents must be a stream reference or an array".to_string(),
        )),
        Err(_) => Ok(Vec::new()),
    }
}

enum ResourcesLocation {
    Indirect(ObjectId),
    Inline,
    Inherited(Dictionary),
}

/// Mutable access to the page's own resource dictionary. Inherited resources
/// are copied onto the page first so the change stays local to it.
fn page_resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, PdfError> {
    let location = match doc.get_dictionary(page_id)?.get(b"Resources") {
        Ok(Object::Reference(id)) => ResourcesLocation::Indirect(*id),
        Ok(Object::Dictionary(_)) => ResourcesLocation::Inline,
        Ok(_) => {
            return Err(PdfError::Malformed(
                "page Resources is not a dictionary".to_string(),
            ));
        }
        Err(_) => {
            let inherited = match inherited_attribute(doc, page_id, b"Resources")? {
                Some(value) => value.as_dict()?.clone(),
                None => Dictionary::new(),
            };
            ResourcesLocation::Inherited(inherited)
        }
    };

    match location {
        ResourcesLocation::Indirect(id) => Ok(doc.get_object_mut(id)?.as_dict_mut()?),
        ResourcesLocation::Inline => Ok(doc
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
        ResourcesLocation::Inherited(resources) => {
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            page.set("Resources", resources);
            Ok(page.get_mut(b"Resources")?.as_dict_mut()?)
        }
    }
}

/// Picks a name under which `target` can live in `entries` without
/// shadowing anything the page already uses.
fn resource_name(entries: &Dictionary, base: &str, target: ObjectId) -> Vec<u8> {
    let mut candidate = base.as_bytes().to_vec();
    let mut suffix = 0u32;
    loop {
        match entries.get(&candidate) {
            Err(_) => return candidate,
            Ok(Object::Reference(id)) if *id == target => return candidate,
            Ok(_) => {
                suffix += 1;
                candidate = format!("{}{}", base, suffix).into_bytes();
            }
        }
    }
}

/// Adds `target` to the page's `category` resources (Font, ExtGState, ...)
/// and returns the name it was registered under.
fn register_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    base: &str,
    target: ObjectId,
) -> Result<Vec<u8>, PdfError> {
    let shared_entries = match page_resources_mut(doc, page_id)?.get(category) {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    let entries = match shared_entries {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => {
            let resources = page_resources_mut(doc, page_id)?;
            if !matches!(resources.get(category), Ok(Object::Dictionary(_))) {
                resources.set(category.to_vec(), Dictionary::new());
            }
            resources.get_mut(category)?.as_dict_mut()?
        }
    };

    let name = resource_name(entries, base, target);
    entries.set(name.clone(), Object::Reference(target));
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    fn overlay_operations_of(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
        let contents = page_contents(doc, page_id).unwrap();
        let last = contents.last().unwrap().as_reference().unwrap();
        let stream = doc.get_object(last).unwrap().as_stream().unwrap();
        let bytes = stream.decompressed_content().unwrap();
        Content::decode(&bytes).unwrap().operations
    }

    fn name_bytes(object: &Object) -> Vec<u8> {
        match object {
            Object::Name(name) => name.clone(),
            other => panic!("expected a name, got {:?}", other),
        }
    }

    fn operand_name(operation: &Operation) -> Vec<u8> {
        name_bytes(&operation.operands[0])
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(WatermarkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_out_of_range_values() {
        let mut config = WatermarkConfig::default();
        config.opacity = 0.0;
        assert!(config.validate().is_err());

        let mut config = WatermarkConfig::default();
        config.opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = WatermarkConfig::default();
        config.font_size = -3.0;
        assert!(config.validate().is_err());

        let mut config = WatermarkConfig::default();
        config.text = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_non_ascii_text() {
        let config = WatermarkConfig {
            text: "機密".to_string(),
            ..WatermarkConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("printable ASCII"));
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(
            "#ff8000".parse::<RgbColor>().unwrap(),
            RgbColor {
                r: 0xff,
                g: 0x80,
                b: 0x00
            }
        );
        assert_eq!("808080".parse::<RgbColor>().unwrap(), RgbColor::GRAY);
        assert!("#12345".parse::<RgbColor>().is_err());
        assert!("#zzzzzz".parse::<RgbColor>().is_err());
        assert_eq!(RgbColor::GRAY.to_string(), "#808080");
    }

    #[test]
    fn test_helvetica_width() {
        let width = helvetica_text_width("AB", 10.0);
        assert!((width - 13.34).abs() < 1e-4);
        assert!(helvetica_text_width("W", 12.0) > helvetica_text_width("i", 12.0));
    }

    #[test]
    fn test_unrotated_text_is_centered() {
        let m = centered_text_matrix((300.0, 400.0), 100.0, 20.0, 0.0);
        assert!((m[0] - 1.0).abs() < 1e-6);
        assert!(m[1].abs() < 1e-6);
        assert!((m[4] - 250.0).abs() < 1e-4);
        assert!((m[5] - 390.0).abs() < 1e-4);
    }

    #[test]
    fn test_quarter_turn_text_is_centered() {
        let m = centered_text_matrix((300.0, 400.0), 100.0, 20.0, 90.0);
        // Baseline runs upwards; start point sits below the centre, shifted right by half the cap height.
        assert!((m[4] - 310.0).abs() < 1e-3);
        assert!((m[5] - 350.0).abs() < 1e-3);
    }

    #[test]
    fn test_apply_stamps_every_page() {
        let input = sample_pdf(3, 2);
        let watermarker = LopdfWatermarker::new(WatermarkConfig::default());
        let stamped = watermarker.apply(&input).unwrap();
        assert_eq!(stamped.page_count, 3);

        let doc = Document::load_mem(&stamped.data).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        for page_id in pages.values() {
            let contents = page_contents(&doc, *page_id).unwrap();
            assert_eq!(contents.len(), 3, "q stream, original content, overlay");

            let operations = overlay_operations_of(&doc, *page_id);
            assert_eq!(operations.first().unwrap().operator, "Q");
            let text = operations.iter().find(|op| op.operator == "Tj").unwrap();
            match &text.operands[0] {
                Object::String(bytes, _) => assert_eq!(bytes.as_slice(), b"CONFIDENTIAL"),
                other => panic!("expected a string operand, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_apply_registers_font_and_opacity() {
        let config = WatermarkConfig {
            opacity: 0.5,
            ..WatermarkConfig::default()
        };
        let output = LopdfWatermarker::new(config)
            .apply(&sample_pdf(1, 0))
            .unwrap()
            .data;
        let doc = Document::load_mem(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();

        let operations = overlay_operations_of(&doc, page_id);
        let tf = operations.iter().find(|op| op.operator == "Tf").unwrap();
        let gs = operations.iter().find(|op| op.operator == "gs").unwrap();

        let resources = inherited_attribute(&doc, page_id, b"Resources")
            .unwrap()
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = resolve(&doc, resources.get(b"Font").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        // The fixture's own font must survive next to ours.
        assert!(fonts.get(b"F1").is_ok());

        let font_ref = fonts.get(&operand_name(tf)).unwrap().as_reference().unwrap();
        let font = doc.get_dictionary(font_ref).unwrap();
        assert_eq!(name_bytes(font.get(b"BaseFont").unwrap()), b"Helvetica".to_vec());

        let gstates = resolve(&doc, resources.get(b"ExtGState").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        let gs_ref = gstates.get(&operand_name(gs)).unwrap().as_reference().unwrap();
        let gstate = doc.get_dictionary(gs_ref).unwrap();
        assert_eq!(gstate.get(b"ca").unwrap().as_float().unwrap(), 0.5);
    }

    #[test]
    fn test_apply_avoids_existing_resource_names() {
        let mut doc = Document::load_mem(&sample_pdf(1, 0)).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let other_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        });
        let fonts = register_resource(&mut doc, page_id, b"Font", FONT_RESOURCE_BASE, other_font)
            .unwrap();
        assert_eq!(fonts, b"WmFont".to_vec());

        let mut input = Vec::new();
        doc.save_to(&mut input).unwrap();

        let output = LopdfWatermarker::new(WatermarkConfig::default())
            .apply(&input)
            .unwrap()
            .data;
        let doc = Document::load_mem(&output).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let operations = overlay_operations_of(&doc, page_id);
        let tf = operations.iter().find(|op| op.operator == "Tf").unwrap();
        assert_eq!(operand_name(tf), b"WmFont1".to_vec());
    }

    #[test]
    fn test_apply_rejects_empty_document() {
        let result = LopdfWatermarker::new(WatermarkConfig::default()).apply(&sample_pdf(0, 0));
        assert!(matches!(result, Err(PdfError::NoPages)));
    }

    #[test]
    fn test_apply_rejects_non_pdf() {
        let result = LopdfWatermarker::new(WatermarkConfig::default()).apply(b"GIF89a");
        assert!(matches!(result, Err(PdfError::NotAPdf)));
    }

    fn set_first_page_rotation(input: &[u8], rotate: Object) -> (Document, ObjectId) {
        let mut doc = Document::load_mem(input).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Rotate", rotate);
        (doc, page_id)
    }

    #[test]
    fn test_page_rotation_accepts_integral_reals() {
        let input = sample_pdf(1, 0);

        let (doc, page_id) = set_first_page_rotation(&input, Object::Integer(-90));
        assert_eq!(page_rotation(&doc, page_id).unwrap(), 270);

        let (doc, page_id) = set_first_page_rotation(&input, Object::Real(90.0));
        assert_eq!(page_rotation(&doc, page_id).unwrap(), 90);

        let (doc, page_id) = set_first_page_rotation(&input, Object::Real(12.5));
        assert_eq!(page_rotation(&doc, page_id).unwrap(), 0);

        let (doc, page_id) = set_first_page_rotation(&input, Object::Name(b"Up".to_vec()));
        assert_eq!(page_rotation(&doc, page_id).unwrap(), 0);
    }

    #[test]
    fn test_apply_handles_real_rotate_value() {
        let (mut doc, _) = set_first_page_rotation(&sample_pdf(1, 0), Object::Real(90.0));
        let mut input = Vec::new();
        doc.save_to(&mut input).unwrap();

        let stamped = LopdfWatermarker::new(WatermarkConfig::default())
            .apply(&input)
            .unwrap();
        assert_eq!(stamped.page_count, 1);
    }

    #[test]
    fn test_media_box_is_inherited() {
        let doc = Document::load_mem(&sample_pdf(1, 0)).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        assert_eq!(page_media_box(&doc, page_id).unwrap(), [0.0, 0.0, 595.0, 842.0]);
        assert_eq!(page_rotation(&doc, page_id).unwrap(), 0);
    }
}
