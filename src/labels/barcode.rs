//! Code-128 barcode as a list of bars

use barcoders::sym::code128::Code128;

use super::LabelError;

/// Character set B selector understood by `barcoders`
const CHARSET_B: char = 'Ɓ';

/// One dark bar, in modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub start: usize,
    pub width: usize,
}

/// Encoded barcode: dark bars plus the total width in modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeBars {
    pub bars: Vec<Bar>,
    pub modules: usize,
}

/// Encodes `data` with Code-128 (set B).
///
/// Fails for input outside printable ASCII.
pub fn encode_code128(data: &str) -> Result<BarcodeBars, LabelError> {
    let data = data.trim();
    if data.is_empty() {
        return Err(LabelError::MissingBarcode);
    }

    let code = Code128::new(format!("{}{}", CHARSET_B, data)).map_err(|e| LabelError::Barcode(e.to_string()))?;
    let modules = code.encode();
    Ok(BarcodeBars {
        bars: bars_from_modules(&modules),
        modules: modules.len(),
    })
}

/// Merges runs of dark modules (`1`) into bars.
fn bars_from_modules(modules: &[u8]) -> Vec<Bar> {
    let mut bars = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &module) in modules.iter().enumerate() {
        match (module == 1, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                bars.push(Bar { start, width: i - start });
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        bars.push(Bar {
            start,
            width: modules.len() - start,
        });
    }
    bars
}
