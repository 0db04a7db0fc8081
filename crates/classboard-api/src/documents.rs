use anyhow::Result;
use docx_rs::{Docx, Paragraph, Run};
use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};

/// Requested download format; anything unrecognized falls back to PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("docx") => DocumentFormat::Docx,
            _ => DocumentFormat::Pdf,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "summary.pdf",
            DocumentFormat::Docx => "summary.docx",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

pub fn render(format: DocumentFormat, content: &str) -> Result<Vec<u8>> {
    match format {
        DocumentFormat::Pdf => render_pdf(content),
        DocumentFormat::Docx => render_docx(content),
    }
}

// US letter, measured in PDF points. Lines are truncated rather than
// wrapped; 110 characters fit the printable width at this size.
const MAX_LINE_CHARS: usize = 110;

fn page_size() -> (Mm, Mm) {
    (Mm::from(Pt(612.0)), Mm::from(Pt(792.0)))
}

fn render_pdf(content: &str) -> Result<Vec<u8>> {
    let (width, height) = page_size();
    let (doc, first_page, first_layer) = PdfDocument::new("Class chat summary", width, height, "text");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = 792.0 - 50.0;

    for line in content.lines() {
        if y < 50.0 {
            let (page, new_layer) = doc.add_page(width, height, "text");
            layer = doc.get_page(page).get_layer(new_layer);
            y = 792.0 - 50.0;
        }
        let text: String = line.chars().take(MAX_LINE_CHARS).collect();
        layer.use_text(text, 11.0, Mm::from(Pt(50.0)), Mm::from(Pt(y)), &font);
        y -= 16.0;
    }

    Ok(doc.save_to_bytes()?)
}

fn render_docx(content: &str) -> Result<Vec<u8>> {
    let mut docx = Docx::new();
    for line in content.lines() {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut buffer)?;
    Ok(buffer.into_inner())
}
