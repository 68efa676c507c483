use crate::types::{CameraRecord, EditableSettings};
use html_escape::{encode_double_quoted_attribute, encode_text};

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// The options an `<input>` element on the admin page can carry.
///
/// Every recognized option is a field here; anything else cannot be set.
/// `checked` emits the bare attribute when true, `value`/`min`/`max` emit
/// the corresponding attributes when present.
#[derive(Debug, Default)]
pub struct InputSpec {
    pub kind: &'static str,
    pub id: String,
    pub checked: Option<bool>,
    pub value: Option<String>,
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl InputSpec {
    pub fn checkbox(id: String, checked: bool) -> Self {
        Self {
            kind: "checkbox",
            id,
            checked: Some(checked),
            ..Default::default()
        }
    }

    pub fn number(id: String, value: u32, min: u32, max: u32) -> Self {
        Self {
            kind: "number",
            id,
            value: Some(value.to_string()),
            min: Some(min),
            max: Some(max),
            ..Default::default()
        }
    }

    pub fn text(id: String, value: String) -> Self {
        Self {
            kind: "text",
            id,
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn render(&self) -> String {
        let mut element = format!(
            r#"<input type="{}" id="{}""#,
            self.kind,
            encode_double_quoted_attribute(&self.id)
        );
        if self.checked == Some(true) {
            element.push_str(" checked");
        }
        if let Some(value) = &self.value {
            element.push_str(&format!(
                r#" value="{}""#,
                encode_double_quoted_attribute(value)
            ));
        }
        if let Some(min) = self.min {
            element.push_str(&format!(r#" min="{min}""#));
        }
        if let Some(max) = self.max {
            element.push_str(&format!(r#" max="{max}""#));
        }
        element.push('>');
        element
    }
}

/// A value rendered as a JavaScript string literal inside a `<script>`
/// block. JSON escaping covers quotes and control characters; `<` is
/// written as `<` so a value containing `</script>` stays inert.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
}

/// A `<select>` whose options are the given values in order.
pub fn select(id: &str, values: &[String]) -> String {
    let options: String = values
        .iter()
        .map(|value| {
            format!(
                r#"<option value="{}">{}</option>"#,
                encode_double_quoted_attribute(value),
                encode_text(value)
            )
        })
        .collect();
    format!(
        r#"<select id="{}">{options}</select>"#,
        encode_double_quoted_attribute(id)
    )
}

/// Render the admin page for the given camera records.
///
/// `pass_key` is the first `pass_key` value of the page's own query string
/// and is embedded so the submit script can forward it to `/configure`.
pub fn render_admin_page(cameras: &[CameraRecord], pass_key: &str) -> String {
    let body: String = if cameras.is_empty() {
        "<p>No cameras connected</p>".to_string()
    } else {
        cameras.iter().map(render_camera).collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Timelapse Camera Admin</title>
    <style>
        body {{ font-family: monospace; margin: 20px; }}
        pre.raw-settings {{ background: #f4f4f4; border: 1px solid #ddd; padding: 10px; max-height: 200px; overflow: auto; }}
        form.camera {{ border: 1px solid #ccc; padding: 10px; margin-bottom: 10px; }}
        .incompatible {{ color: #a00; }}
        button.update {{ margin-bottom: 20px; }}
    </style>
</head>
<body>
    <h1>Timelapse Camera Admin</h1>
    {body}
    <script>
        const PASS_KEY = {pass_key};

        function configure(name) {{
            const field = (suffix) => document.getElementById(name + '.' + suffix);
            // move the selected picture size to the front of the preference order
            const sizes = [];
            const options = field('sizes').options;
            if (options.selectedIndex != -1) {{
                sizes.push(options[options.selectedIndex].text);
                for (let i = 0; i < options.length; i++)
                    if (i != options.selectedIndex)
                        sizes.push(options[i].text);
            }}
            const config = {{
                schedule: {{
                    enabled: field('enabled').checked,
                    interval: parseInt(field('interval').value, 10),
                    weekdays: [
                        field('monday').checked,
                        field('tuesday').checked,
                        field('wednesday').checked,
                        field('thursday').checked,
                        field('friday').checked,
                        field('saturday').checked,
                        field('sunday').checked
                    ],
                    daily_start_time: field('start').value,
                    daily_end_time: field('end').value
                }},
                camera: {{
                    jpeg_quality: parseInt(field('quality').value, 10),
                    picture_sizes: sizes
                }}
            }};
            const query = 'configure?camera=' + encodeURIComponent(name) +
                '&info=' + encodeURIComponent(JSON.stringify(config)) +
                '&pass_key=' + encodeURIComponent(PASS_KEY);
            fetch(query)
                .then(r => r.text().then(t => alert(r.status + ': ' + t)))
                .catch(e => alert('error: ' + e));
        }}
    </script>
</body>
</html>
"#,
        pass_key = js_string(pass_key),
    )
}

fn render_camera(record: &CameraRecord) -> String {
    // pretty-printed raw record so the operator sees exactly what the
    // coordinator published
    let raw = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
    let mut html = format!(
        "<pre class=\"raw-settings\">{}</pre>\n",
        encode_text(&raw)
    );

    match record.editable() {
        Some(editable) => {
            // presence checked by editable()
            let name = record.endpoint.as_deref().unwrap_or_default();
            html.push_str(&render_form(name, record.uuid.as_deref(), &editable));
            html.push_str(&format!(
                "<button class=\"update\" data-name=\"{}\" onclick=\"configure(this.dataset.name)\">update</button><br>\n",
                encode_double_quoted_attribute(name)
            ));
        }
        None => {
            html.push_str(
                "<form class=\"camera\"><span class=\"incompatible\">Incompatible settings version...</span></form><br>\n",
            );
        }
    }
    html
}

fn render_form(name: &str, uuid: Option<&str>, editable: &EditableSettings) -> String {
    let schedule = &editable.schedule;
    let camera = &editable.camera;
    let mut form = String::from("<form class=\"camera\">\n");

    form.push_str(&InputSpec::checkbox(format!("{name}.enabled"), schedule.enabled).render());
    form.push_str("enabled<br>\n");
    form.push_str("interval ");
    form.push_str(&InputSpec::number(format!("{name}.interval"), schedule.interval, 1, 300).render());
    form.push_str("<br>\n");

    for (day, enabled) in WEEKDAYS.iter().zip(schedule.weekdays) {
        form.push_str(&InputSpec::checkbox(format!("{name}.{day}"), enabled).render());
        form.push_str(&format!("{day}   "));
    }
    form.push_str("<br>\n");

    form.push_str("daily start time ");
    form.push_str(
        &InputSpec::text(format!("{name}.start"), schedule.daily_start_time.clone()).render(),
    );
    form.push_str("<br>\n");
    form.push_str("daily end time ");
    form.push_str(
        &InputSpec::text(format!("{name}.end"), schedule.daily_end_time.clone()).render(),
    );
    form.push_str("<br>\n");

    form.push_str("jpeg quality ");
    form.push_str(&InputSpec::number(format!("{name}.quality"), camera.jpeg_quality, 1, 100).render());
    form.push_str("<br>\n");
    form.push_str("picture sizes ");
    form.push_str(&select(&format!("{name}.sizes"), &camera.picture_sizes));
    form.push_str("<br>\n");

    if let Some(uuid) = uuid {
        form.push_str(&format!(
            "<a href=\"cameras/{}/\">{} photos</a><br>\n",
            encode_double_quoted_attribute(uuid),
            encode_text(uuid)
        ));
    }

    form.push_str("</form>\n");
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CaptureSettings, ScheduleSettings};
    use serde_json::json;

    fn record() -> CameraRecord {
        serde_json::from_value(json!({
            "endpoint": "http://10.0.0.7:9000",
            "uuid": "cam-7",
            "photo_count": 3,
            "settings": {
                "schedule": {
                    "enabled": true,
                    "interval": 30,
                    "weekdays": [true, false, true, false, true, false, false],
                    "daily_start_time": "06:00",
                    "daily_end_time": "20:00"
                },
                "camera": {
                    "jpeg_quality": 85,
                    "picture_sizes": ["1600x1200", "800x600"]
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn checkbox_emits_checked_only_when_set() {
        let checked = InputSpec::checkbox("c.enabled".to_string(), true).render();
        assert_eq!(checked, r#"<input type="checkbox" id="c.enabled" checked>"#);
        let unchecked = InputSpec::checkbox("c.enabled".to_string(), false).render();
        assert_eq!(unchecked, r#"<input type="checkbox" id="c.enabled">"#);
    }

    #[test]
    fn number_emits_value_and_bounds() {
        let input = InputSpec::number("c.quality".to_string(), 85, 1, 100).render();
        assert_eq!(
            input,
            r#"<input type="number" id="c.quality" value="85" min="1" max="100">"#
        );
    }

    #[test]
    fn text_value_is_attribute_escaped() {
        let input = InputSpec::text("c.start".to_string(), r#""><script>"#.to_string()).render();
        assert!(!input.contains("<script>"));
        assert!(input.contains("&lt;script&gt;") || input.contains("&quot;"));
    }

    #[test]
    fn pass_key_is_forwarded_verbatim() {
        // the key is opaque; entity-escaping it would mangle what the
        // submit script sends to /configure
        let html = render_admin_page(&[], "a&b");
        assert!(html.contains(r#"const PASS_KEY = "a&b";"#));
        let html = render_admin_page(&[], r#"a"b"#);
        assert!(html.contains(r#"const PASS_KEY = "a\"b";"#));
    }

    #[test]
    fn pass_key_cannot_close_the_script_block() {
        let html = render_admin_page(&[], "x</script>y");
        assert!(!html.contains("x</script>y"));
        assert!(html.contains(r#"const PASS_KEY = "x</script>y";"#));
    }

    #[test]
    fn select_escapes_attribute_position() {
        let html = select("c.sizes", &[r#"800x600" onmouseover="x"#.to_string()]);
        assert!(!html.contains(r#"value="800x600" onmouseover"#));
        assert!(html.contains("&quot;"));
    }

    #[test]
    fn select_keeps_preference_order() {
        let html = select(
            "c.sizes",
            &["1600x1200".to_string(), "800x600".to_string()],
        );
        let first = html.find("1600x1200").unwrap();
        let second = html.find("800x600").unwrap();
        assert!(first < second);
    }

    #[test]
    fn page_renders_form_for_compatible_camera() {
        let html = render_admin_page(&[record()], "hunter2");
        assert!(html.contains(r#"id="http://10.0.0.7:9000.enabled""#));
        assert!(html.contains(r#"id="http://10.0.0.7:9000.interval" value="30""#));
        assert!(html.contains(r#"id="http://10.0.0.7:9000.tuesday""#));
        assert!(html.contains(r#"value="06:00""#));
        assert!(html.contains(r#"const PASS_KEY = "hunter2""#));
        assert!(html.contains(r#"href="cameras/cam-7/""#));
        assert!(html.contains("cam-7 photos"));
    }

    #[test]
    fn page_shows_raw_settings_dump() {
        let html = render_admin_page(&[record()], "");
        assert!(html.contains("raw-settings"));
        assert!(html.contains("jpeg_quality"));
    }

    #[test]
    fn incompatible_camera_gets_notice_and_no_form() {
        let mut bad = record();
        bad.settings = None;
        let html = render_admin_page(&[bad], "");
        assert!(html.contains("Incompatible settings version..."));
        assert!(!html.contains("jpeg quality"));
    }

    #[test]
    fn incompatible_camera_does_not_stop_the_rest() {
        let mut bad = record();
        bad.endpoint = None;
        let html = render_admin_page(&[bad, record()], "");
        assert!(html.contains("Incompatible settings version..."));
        assert!(html.contains(r#"id="http://10.0.0.7:9000.enabled""#));
    }

    #[test]
    fn empty_fleet_renders_placeholder() {
        let html = render_admin_page(&[], "");
        assert!(html.contains("No cameras connected"));
    }

    #[test]
    fn weekday_checkboxes_follow_schedule() {
        let editable = EditableSettings {
            schedule: ScheduleSettings {
                enabled: false,
                interval: 10,
                weekdays: [true, false, false, false, false, false, true],
                daily_start_time: String::new(),
                daily_end_time: String::new(),
            },
            camera: CaptureSettings {
                jpeg_quality: 50,
                picture_sizes: vec![],
            },
        };
        let form = render_form("cam", None, &editable);
        assert!(form.contains(r#"<input type="checkbox" id="cam.monday" checked>"#));
        assert!(form.contains(r#"<input type="checkbox" id="cam.tuesday">"#));
        assert!(form.contains(r#"<input type="checkbox" id="cam.sunday" checked>"#));
    }
}
