//! Overlay panel that renders the latest snapshot
//!
//! The panel only displays what it is given. It never reads metric state and
//! removing it leaves the observers running.

use vitals_core::{PanelConfig, PanelText};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

pub const PANEL_ID: &str = "perf-panel";
pub const REFRESH_BUTTON_ID: &str = "perf-refresh";
pub const CLOSE_BUTTON_ID: &str = "perf-close";

const CELLS: [(&str, &str); 6] = [
    ("FCP", "m-fcp"),
    ("LCP", "m-lcp"),
    ("CLS", "m-cls"),
    ("TBT (≈)", "m-tbt"),
    ("Requests", "m-req"),
    ("Total weight", "m-bytes"),
];

pub struct Panel {
    document: Document,
    element: Element,
}

impl Panel {
    /// Build the panel element (not yet attached)
    ///
    /// # Errors
    /// Returns JsValue error if the element cannot be created or styled
    pub fn new(document: Document, config: &PanelConfig) -> Result<Self, JsValue> {
        let element = document.create_element("div")?;
        element.set_id(PANEL_ID);
        element.set_inner_html(&panel_markup(&config.title));

        if let Some(html_element) = element.dyn_ref::<HtmlElement>() {
            let style = html_element.style();
            let (vertical, horizontal) = config.corner.anchors();
            let offset = format!("{}px", config.offset_px);
            style.set_property("position", "fixed")?;
            style.set_property(vertical, &offset)?;
            style.set_property(horizontal, &offset)?;
            style.set_property("z-index", "9999")?;
            style.set_property("width", &format!("{}px", config.width_px))?;
            style.set_property("max-width", "90vw")?;
            style.set_property("font-family", "ui-sans-serif, system-ui")?;
            style.set_property("background", "rgba(10,12,28,.9)")?;
            style.set_property("color", "#E8ECF1")?;
            style.set_property("border", "1px solid rgba(255,255,255,.12)")?;
            style.set_property("border-radius", "12px")?;
            style.set_property("box-shadow", "0 10px 40px rgba(0,0,0,.5)")?;
            style.set_property("backdrop-filter", "blur(6px)")?;
            style.set_property("padding", "12px 14px")?;
        }

        Ok(Self { document, element })
    }

    pub fn is_attached(&self) -> bool {
        self.element.is_connected()
    }

    /// Append to `<body>`. Returns `false` if there is no body yet.
    pub fn attach(&self) -> Result<bool, JsValue> {
        if self.is_attached() {
            return Ok(true);
        }
        match self.document.body() {
            Some(body) => {
                body.append_child(&self.element)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write the formatted values into their cells
    pub fn render(&self, text: &PanelText) -> Result<(), JsValue> {
        for (id, value) in text.cells() {
            if let Some(cell) = self.element.query_selector(&format!("#{}", id))? {
                cell.set_text_content(Some(value));
            }
        }
        Ok(())
    }

    pub fn remove(&self) {
        self.element.remove();
    }
}

fn panel_markup(title: &str) -> String {
    let cells: String = CELLS
        .iter()
        .map(|(label, id)| {
            format!(
                r#"<div><div style="opacity:.8">{}</div><div id="{}">-</div></div>"#,
                label, id
            )
        })
        .collect();

    format!(
        r#"<div style="display:flex;align-items:center;justify-content:space-between;margin-bottom:8px">
  <strong>{title}</strong>
  <div>
    <button id="{refresh}" style="background:#7C5CFF;color:white;border:0;border-radius:8px;padding:6px 10px;cursor:pointer">Measure</button>
    <button id="{close}" style="background:transparent;color:#c9d1d9;border:1px solid rgba(255,255,255,.2);border-radius:8px;padding:6px 8px;margin-left:6px;cursor:pointer">×</button>
  </div>
</div>
<div style="display:grid;grid-template-columns:1fr 1fr;gap:8px;font-size:13px">{cells}</div>"#,
        title = escape_html(title),
        refresh = REFRESH_BUTTON_ID,
        close = CLOSE_BUTTON_ID,
        cells = cells,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_has_every_cell() {
        let markup = panel_markup("Page vitals");
        for (_, id) in CELLS {
            assert!(markup.contains(&format!(r#"id="{}""#, id)));
        }
        assert!(markup.contains(REFRESH_BUTTON_ID));
        assert!(markup.contains(CLOSE_BUTTON_ID));
    }

    #[test]
    fn test_title_is_escaped() {
        let markup = panel_markup("<b>x</b>");
        assert!(markup.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(!markup.contains("<b>x</b>"));
    }

    #[test]
    fn test_cell_ids_match_display_text() {
        let text = PanelText {
            fcp: String::new(),
            lcp: String::new(),
            cls: String::new(),
            tbt: String::new(),
            requests: String::new(),
            bytes: String::new(),
        };
        let ids: Vec<&str> = text.cells().iter().map(|(id, _)| *id).collect();
        let panel_ids: Vec<&str> = CELLS.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, panel_ids);
    }
}
