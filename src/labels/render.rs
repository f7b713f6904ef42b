//! Per-article label PDF
//!
//! Every order contributes two 120×75 mm pages: its vendor sticker, followed by the product
//! page (barcode plus description). The product page is identical for all orders of an
//! article, so its content stream is written once and referenced by every such page.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::barcode::{encode_code128, BarcodeBars};
use super::font::LabelFont;
use super::LabelError;
use crate::core::config::label;
use crate::core::types::Product;

/// Points per millimetre
const MM: f32 = 72.0 / 25.4;

const FONT_KEY: &str = "F1";
const IMAGE_KEY: &str = "Im1";

const BAR_HEIGHT_MM: f32 = 16.0;
const BAR_BOTTOM_MM: f32 = 50.0;
const MODULE_MM: f32 = 0.4;
const MAX_BARCODE_WIDTH_MM: f32 = 100.0;
const DIGITS_BASELINE_MM: f32 = 45.0;

const TEXT_LEFT_MM: f32 = 8.0;
const TEXT_TOP_MM: f32 = 38.0;
const LEADING_MM: f32 = 5.0;
const FONT_SIZE: f32 = 9.0;
const MAX_NAME_LINES: usize = 3;

/// Renders the label document of one article to `out`.
///
/// `stickers` holds one PNG per order, in page order. Returns the number of pages written.
pub fn render_article_pdf(
    stickers: &[PathBuf],
    product: &Product,
    font: &LabelFont,
    out: &Path,
) -> Result<usize, LabelError> {
    let barcode = product.barcode.trim();
    if barcode.is_empty() {
        return Err(LabelError::MissingBarcode);
    }
    if product.name.trim().is_empty() {
        return Err(LabelError::MissingName);
    }
    let bars = encode_code128(barcode)?;

    let lines = description_lines(product, font);
    let used_text = format!("{}{}", barcode, lines.concat());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        (label::PAGE_WIDTH_MM * MM).into(),
        (label::PAGE_HEIGHT_MM * MM).into(),
    ];

    let font_id = font.add_to_document(&mut doc, &used_text);
    let product_resources = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_KEY => font_id },
    });
    let product_content = product_page_content(&bars, barcode, &lines, font)?;
    let product_content_id = doc.add_object(Stream::new(dictionary! {}, product_content));

    let mut kids: Vec<Object> = Vec::with_capacity(stickers.len() * 2);
    for sticker in stickers {
        let image_id = add_sticker_image(&mut doc, sticker)?;
        let resources = doc.add_object(dictionary! {
            "XObject" => dictionary! { IMAGE_KEY => image_id },
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, sticker_page_content()?));

        for (resources, contents) in [(resources, content_id), (product_resources, product_content_id)] {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources,
                "Contents" => contents,
            });
            kids.push(page_id.into());
        }
    }

    let page_count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    doc.save(out)?;
    Ok(page_count)
}

/// Name (wrapped) followed by article, country and brand.
fn description_lines(product: &Product, font: &LabelFont) -> Vec<String> {
    let max_width = (label::PAGE_WIDTH_MM - 2.0 * TEXT_LEFT_MM) * MM;
    let mut lines = wrap_text(product.name.trim(), font, FONT_SIZE, max_width);
    if lines.len() > MAX_NAME_LINES {
        lines.truncate(MAX_NAME_LINES);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }

    lines.push(format!("Артикул: {}", product.article));
    lines.push(format!("Страна: {}", label::COUNTRY));
    lines.push(format!("Бренд: {}", label::BRAND));
    lines
}

/// Greedy word wrap. A single word wider than `max_width` gets a line of its own.
fn wrap_text(text: &str, font: &LabelFont, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if font.text_width(&candidate, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn product_page_content(
    bars: &BarcodeBars,
    digits: &str,
    lines: &[String],
    font: &LabelFont,
) -> Result<Vec<u8>, LabelError> {
    let page_width = label::PAGE_WIDTH_MM * MM;
    let module = (MODULE_MM * MM).min(MAX_BARCODE_WIDTH_MM * MM / bars.modules.max(1) as f32);
    let left = (page_width - module * bars.modules as f32) / 2.0;

    let mut operations = vec![Operation::new("g", vec![0.into()])];
    for bar in &bars.bars {
        operations.push(Operation::new(
            "re",
            vec![
                (left + bar.start as f32 * module).into(),
                (BAR_BOTTOM_MM * MM).into(),
                (bar.width as f32 * module).into(),
                (BAR_HEIGHT_MM * MM).into(),
            ],
        ));
    }
    operations.push(Operation::new("f", vec![]));

    let digits_x = (page_width - font.text_width(digits, FONT_SIZE)) / 2.0;
    push_text(&mut operations, font, digits, digits_x, DIGITS_BASELINE_MM * MM);

    for (i, line) in lines.iter().enumerate() {
        let y = (TEXT_TOP_MM - i as f32 * LEADING_MM) * MM;
        push_text(&mut operations, font, line, TEXT_LEFT_MM * MM, y);
    }

    Ok(Content { operations }.encode()?)
}

fn push_text(operations: &mut Vec<Operation>, font: &LabelFont, text: &str, x: f32, y: f32) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec![FONT_KEY.into(), FONT_SIZE.into()]));
    operations.push(Operation::new("Td", vec![x.into(), y.into()]));
    operations.push(Operation::new("Tj", vec![font.encode(text)]));
    operations.push(Operation::new("ET", vec![]));
}

/// Sticker scaled to the fixed image box, centred on the page.
fn sticker_page_content() -> Result<Vec<u8>, LabelError> {
    let width = label::IMAGE_WIDTH_MM * MM;
    let height = label::IMAGE_HEIGHT_MM * MM;
    let x = (label::PAGE_WIDTH_MM - label::IMAGE_WIDTH_MM) / 2.0 * MM;
    let y = (label::PAGE_HEIGHT_MM - label::IMAGE_HEIGHT_MM) / 2.0 * MM;

    let operations = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), y.into()],
        ),
        Operation::new("Do", vec![IMAGE_KEY.into()]),
        Operation::new("Q", vec![]),
    ];
    Ok(Content { operations }.encode()?)
}

/// Decodes a sticker PNG into an RGB image XObject, flattening transparency onto white.
fn add_sticker_image(doc: &mut Document, path: &Path) -> Result<ObjectId, LabelError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            rgb.push(((u16::from(channel) * alpha + 255 * (255 - alpha)) / 255) as u8);
        }
    }

    Ok(doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn write_png(path: &Path) {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(8, 6, |x, _| {
            if x % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        });
        img.save(path).unwrap();
    }

    fn product(name: &str, barcode: &str) -> Product {
        Product {
            article: "A1".into(),
            name: name.into(),
            barcode: barcode.into(),
        }
    }

    #[test]
    fn test_renders_two_pages_per_order() {
        let dir = tempfile::tempdir().unwrap();
        let stickers: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("{}.png", i))).collect();
        stickers.iter().for_each(|p| write_png(p));
        let out = dir.path().join("A1.pdf");

        let pages = render_article_pdf(&stickers, &product("Widget", "000111"), &LabelFont::Helvetica, &out).unwrap();
        assert_eq!(pages, 6);

        let doc = Document::load(&out).unwrap();
        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        assert_eq!(page_ids.len(), 6);

        // Product pages (every second one) share a content stream
        let contents: Vec<ObjectId> = page_ids
            .iter()
            .map(|id| doc.get_dictionary(*id).unwrap().get(b"Contents").unwrap().as_reference().unwrap())
            .collect();
        assert_eq!(contents[1], contents[3]);
        assert_eq!(contents[3], contents[5]);
        assert_ne!(contents[0], contents[2]);
    }

    #[test]
    fn test_missing_fields_are_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("A1.pdf");
        let font = LabelFont::Helvetica;

        assert!(matches!(
            render_article_pdf(&[], &product("Widget", ""), &font, &out),
            Err(LabelError::MissingBarcode)
        ));
        assert!(matches!(
            render_article_pdf(&[], &product("  ", "000111"), &font, &out),
            Err(LabelError::MissingName)
        ));
        assert!(matches!(
            render_article_pdf(&[], &product("Widget", "код"), &font, &out),
            Err(LabelError::Barcode(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_unreadable_sticker_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let sticker = dir.path().join("1.png");
        std::fs::write(&sticker, b"not a png").unwrap();

        let result = render_article_pdf(&[sticker], &product("Widget", "000111"), &LabelFont::Helvetica, &dir.path().join("A1.pdf"));
        assert!(matches!(result, Err(LabelError::Image(_))));
    }

    #[test]
    fn test_cyrillic_text_survives_embedded_font() {
        let dir = tempfile::tempdir().unwrap();
        let sticker = dir.path().join("1.png");
        write_png(&sticker);
        let out = dir.path().join("A1.pdf");
        let font = LabelFont::load(&crate::labels::font::tests::fixture_font_path()).unwrap();

        render_article_pdf(&[sticker], &product("Футболка синяя", "000111"), &font, &out).unwrap();

        let doc = Document::load(&out).unwrap();
        let text = doc.extract_text(&[2]).unwrap();
        assert!(text.contains("Футболка синяя"), "extracted: {:?}", text);
        assert!(text.contains("Артикул: A1"), "extracted: {:?}", text);
        assert!(text.contains("000111"), "extracted: {:?}", text);
    }

    #[test]
    fn test_long_names_wrap_and_truncate() {
        let name = "очень ".repeat(60);
        let lines = description_lines(&product(&name, "1"), &LabelFont::Helvetica);
        assert_eq!(lines.len(), MAX_NAME_LINES + 3);
        assert!(lines[MAX_NAME_LINES - 1].ends_with("..."));
        assert_eq!(lines[MAX_NAME_LINES], "Артикул: A1");
        assert_eq!(lines.last().map(String::as_str), Some("Бренд: CVT"));
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        let lines = wrap_text("Футболка синяя", &LabelFont::Helvetica, FONT_SIZE, 300.0);
        assert_eq!(lines, vec!["Футболка синяя"]);
    }
}
