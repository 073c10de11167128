// A rendered visualization and its embeddable forms: inline data string,
// HTML fragment, PNG bytes, JSON summary.

use cupviz_core::{ColorScale, RasterError, RasterImage};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Figure {
    /// Stable kind name, e.g. `match-heatmap`.
    pub kind: &'static str,
    pub title: String,
    pub image: RasterImage,
    pub scale: Option<ColorScale>,
    /// Category labels along a chart axis, in drawing order.
    pub labels: Vec<String>,
}

/// JSON-friendly description of a figure, with the image inline.
#[derive(Debug, Serialize)]
pub struct FigureSummary<'a> {
    pub kind: &'static str,
    pub title: &'a str,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<&'a ColorScale>,
    #[serde(skip_serializing_if = "no_labels")]
    pub labels: &'a [String],
    pub src: String,
}

impl Figure {
    pub fn new(kind: &'static str, title: impl Into<String>, image: RasterImage) -> Self {
        Self {
            kind,
            title: title.into(),
            image,
            scale: None,
            labels: Vec::new(),
        }
    }

    pub fn with_scale(mut self, scale: ColorScale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn to_png(&self) -> Result<Vec<u8>, RasterError> {
        self.image.to_png()
    }

    pub fn to_data_uri(&self) -> Result<String, RasterError> {
        self.image.to_data_uri()
    }

    /// `<figure>` fragment with the image inline and the title as caption.
    pub fn to_html(&self) -> Result<String, RasterError> {
        let title = escape_html(&self.title);
        Ok(format!(
            "<figure class=\"cupviz\" data-kind=\"{kind}\">\n  \
             <img src=\"{src}\" alt=\"{title}\" width=\"{w}\" height=\"{h}\">\n  \
             <figcaption>{title}</figcaption>\n\
             </figure>\n",
            kind = self.kind,
            src = self.to_data_uri()?,
            w = self.image.width(),
            h = self.image.height(),
        ))
    }

    pub fn summary(&self) -> Result<FigureSummary<'_>, RasterError> {
        Ok(FigureSummary {
            kind: self.kind,
            title: &self.title,
            width: self.image.width(),
            height: self.image.height(),
            mime_type: self.image.mime_type(),
            scale: self.scale.as_ref(),
            labels: &self.labels,
            src: self.to_data_uri()?,
        })
    }
}

fn no_labels(labels: &&[String]) -> bool {
    labels.is_empty()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn figure(title: &str) -> Figure {
        Figure::new("top-players", title, RasterImage::new(4, 3, Rgba([1, 2, 3, 255])))
    }

    #[test]
    fn html_embeds_inline_png_and_escapes_title() {
        let html = figure("Messi's <Heatmap>").to_html().unwrap();
        assert!(html.starts_with("<figure class=\"cupviz\" data-kind=\"top-players\">"));
        assert!(html.contains("src=\"data:image/png;base64,"));
        assert!(html.contains("width=\"4\" height=\"3\""));
        assert!(html.contains("<figcaption>Messi&#39;s &lt;Heatmap&gt;</figcaption>"));
        assert!(!html.contains("<Heatmap>"));
    }

    #[test]
    fn data_uri_decodes_to_same_pixels() {
        let fig = figure("x");
        let back = RasterImage::from_data_uri(&fig.to_data_uri().unwrap()).unwrap();
        assert_eq!(back, fig.image);
    }

    #[test]
    fn summary_serializes_without_empty_fields() {
        let fig = figure("Top players");
        let json = serde_json::to_value(fig.summary().unwrap()).unwrap();
        assert_eq!(json["kind"], "top-players");
        assert_eq!(json["width"], 4);
        assert_eq!(json["mime_type"], "image/png");
        assert!(json.get("scale").is_none());
        assert!(json.get("labels").is_none());
    }

    #[test]
    fn summary_includes_scale_and_labels() {
        let fig = figure("t")
            .with_scale(ColorScale::new(0.0, 1.0, Default::default()))
            .with_labels(vec!["Messi".into()]);
        let json = serde_json::to_value(fig.summary().unwrap()).unwrap();
        assert_eq!(json["scale"]["max"], 1.0);
        assert_eq!(json["labels"][0], "Messi");
    }
}
