use lopdf::Document;

use super::IntakeError;

/// Re-serialises a PDF: unreferenced objects are pruned and content streams
/// flate-compressed. A document that cannot be parsed is rejected outright.
pub fn recompress_pdf(bytes: &[u8]) -> Result<Vec<u8>, IntakeError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| IntakeError::Compression(e.to_string()))?;

    doc.prune_objects();
    doc.compress();

    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out)
        .map_err(|e| IntakeError::Compression(e.to_string()))?;

    if !out.starts_with(b"%PDF-") {
        return Err(IntakeError::Compression(
            "re-serialised output is not a PDF".to_string(),
        ));
    }
    Ok(out)
}
