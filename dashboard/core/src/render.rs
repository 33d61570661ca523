//! Panel Rendering
//!
//! Pure functions from records to a [`Fragment`] tree. Nothing here touches
//! a page, a terminal or the network; surfaces decide what to do with the
//! tree (the CLI serializes it with [`Fragment::to_html`]).
//!
//! Renderers never fail. Missing fields render as [`PLACEHOLDER`], missing
//! numbers as 0, and markup found inside text fields is stripped before it
//! reaches the tree.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::DateTime;
use regex::Regex;
use serde_json::Value;

use crate::panel::PanelId;
use crate::record::Record;
use crate::rss::DATE_FORMAT;
use crate::tabs::TabSet;

/// Text shown for a missing field
pub const PLACEHOLDER: &str = "—";

/// Maximum characters of a news description
pub const DESCRIPTION_LIMIT: usize = 200;

// ============================================================================
// Fragment Tree
// ============================================================================

/// A node of rendered markup
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// An element with children
    Element(Element),
    /// Plain text (escaped on serialization)
    Text(String),
}

/// An element node
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    /// Tag name
    pub tag: String,
    /// `id` attribute
    pub id: Option<String>,
    /// CSS classes, in order
    pub classes: Vec<String>,
    /// Other attributes, in order
    pub attrs: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<Fragment>,
}

const VOID_TAGS: &[&str] = &["img", "br", "hr", "input", "meta", "link"];

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a class
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Append an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Append a child node
    #[must_use]
    pub fn child(mut self, child: impl Into<Fragment>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several child nodes
    #[must_use]
    pub fn children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Fragment>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Append a text node
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Fragment::Text(text.into()))
    }

    /// Whether the element carries `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Value of an attribute
    #[must_use]
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl From<Element> for Fragment {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl Fragment {
    /// Serialize to HTML, escaping text and attribute values
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(&escape_text(text)),
            Self::Element(el) => {
                let _ = write!(out, "<{}", el.tag);
                if let Some(ref id) = el.id {
                    let _ = write!(out, " id=\"{}\"", escape_attr(id));
                }
                if !el.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape_attr(&el.classes.join(" ")));
                }
                for (name, value) in &el.attrs {
                    let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
                }
                if VOID_TAGS.contains(&el.tag.as_str()) && el.children.is_empty() {
                    out.push('>');
                    return;
                }
                out.push('>');
                for child in &el.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }

    /// Concatenated text of this node and its descendants
    #[must_use]
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element(el) => el.children.iter().map(Fragment::text_content).collect(),
        }
    }

    /// All descendant elements (including self) carrying `class`
    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_by_class(class, &mut found);
        found
    }

    fn collect_by_class<'a>(&'a self, class: &str, found: &mut Vec<&'a Element>) {
        if let Self::Element(el) = self {
            if el.has_class(class) {
                found.push(el);
            }
            for child in &el.children {
                child.collect_by_class(class, found);
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ============================================================================
// Text Helpers
// ============================================================================

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

fn numeric_entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&#(x?[0-9a-fA-F]+);").expect("valid entity regex"))
}

fn decode_entities(text: &str) -> String {
    let decoded = numeric_entity_regex().replace_all(text, |caps: &regex::Captures<'_>| {
        let digits = &caps[1];
        let code = match digits.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => digits.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });

    decoded
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Reduce a text field to plain text for display
///
/// Strips tags (including malformed fragments), decodes common entities,
/// collapses whitespace and truncates to `limit` characters, appending
/// `"..."` when anything was cut.
#[must_use]
pub fn plain_text(raw: &str, limit: usize) -> String {
    let stripped = tag_regex().replace_all(raw, " ");
    // An unterminated `<tag` at the end survives the regex; drop it
    let stripped = match stripped.rfind('<') {
        Some(pos) if !stripped[pos..].contains('>') => &stripped[..pos],
        _ => &stripped[..],
    };
    let decoded = decode_entities(stripped);
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > limit {
        let truncated: String = collapsed.chars().take(limit).collect();
        format!("{}...", truncated.trim_end())
    } else {
        collapsed
    }
}

fn text_or_placeholder(record: &Record, key: &str) -> String {
    record
        .get(key)
        .and_then(value_text)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Display text of a scalar value; `None` for null, empty strings and containers
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(
            n.as_f64()
                .map_or_else(|| n.to_string(), format_number),
        ),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integral floats print without a fractional part (`16.0` → `16`)
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

fn percent_of(record: &Record, key: &str) -> u64 {
    record.u64_field(key).unwrap_or(0).min(100)
}

fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim()).map_or_else(
            |_| raw.to_string(),
            |d| d.format(DATE_FORMAT).to_string(),
        ),
        None => PLACEHOLDER.to_string(),
    }
}

fn labeled(label: &str, value: impl Into<Fragment>) -> Element {
    Element::new("div")
        .child(Element::new("strong").text(format!("{label}:")))
        .text(" ")
        .child(value)
}

fn progress_bar(percent: u64) -> Element {
    Element::new("div").class("progress-bar").child(
        Element::new("div")
            .class("progress-fill")
            .attr("style", format!("width: {percent}%")),
    )
}

// ============================================================================
// Panels
// ============================================================================

/// Render records for any panel
#[must_use]
pub fn render_panel(panel: PanelId, records: &[Record]) -> Fragment {
    match panel {
        PanelId::Epics => render_epics(records),
        PanelId::Cron => render_cron(records),
        PanelId::News => render_news(records),
        PanelId::System => render_system(records),
    }
}

/// Completion percentage of an epic
///
/// `round(tasksCompleted / totalTasks * 100)`, or 0 without a total.
#[must_use]
pub fn completion_percent(epic: &Record) -> u64 {
    let completed = epic.u64_field("tasksCompleted").unwrap_or(0);
    match epic.u64_field("totalTasks") {
        Some(total) if total > 0 => {
            let pct = (completed as f64 / total as f64 * 100.0).round();
            (pct as u64).min(100)
        }
        _ => 0,
    }
}

/// Badge class for an epic status
#[must_use]
pub fn epic_status_class(status: Option<&str>) -> &'static str {
    match status {
        Some("completed") => "status-success",
        Some("in-progress") => "status-warning",
        _ => "status-info",
    }
}

/// Class for an epic priority
#[must_use]
pub fn priority_class(priority: Option<&str>) -> &'static str {
    match priority {
        Some("high") => "priority-high",
        Some("low") => "priority-low",
        _ => "priority-medium",
    }
}

/// Epic card grid
#[must_use]
pub fn render_epics(records: &[Record]) -> Fragment {
    let cards = records.iter().map(|epic| {
        let status = epic.str_field("status");
        let priority = epic.str_field("priority");
        let pct = completion_percent(epic);
        let done = epic.u64_field("tasksCompleted").unwrap_or(0);
        let total = epic.u64_field("totalTasks").unwrap_or(0);

        let memory = if epic.bool_field("persistentMemory").unwrap_or(false) {
            format!(
                "💾 Persistent Memory: {}",
                text_or_placeholder(epic, "memoryLocation")
            )
        } else {
            "⏳ Temporary Memory".to_string()
        };

        Element::new("div")
            .class("epic-card")
            .child(
                Element::new("div")
                    .class("epic-header")
                    .child(
                        Element::new("h3")
                            .class("epic-title")
                            .text(plain_text(&text_or_placeholder(epic, "title"), usize::MAX)),
                    )
                    .child(
                        Element::new("span")
                            .class("epic-status-badge")
                            .class(epic_status_class(status))
                            .text(status.map_or_else(|| PLACEHOLDER.to_string(), str::to_uppercase)),
                    ),
            )
            .child(
                Element::new("div")
                    .class("epic-description")
                    .text(plain_text(&text_or_placeholder(epic, "description"), usize::MAX)),
            )
            .child(
                Element::new("div")
                    .class("epic-meta")
                    .child(labeled("Progress", format!("{pct}% ({done}/{total})")))
                    .child(labeled("Due", text_or_placeholder(epic, "dueDate")))
                    .child(labeled("Owner", text_or_placeholder(epic, "owner")))
                    .child(labeled(
                        "Priority",
                        Element::new("span").class(priority_class(priority)).text(
                            priority.map_or_else(|| PLACEHOLDER.to_string(), str::to_uppercase),
                        ),
                    )),
            )
            .child(
                Element::new("div")
                    .class("epic-stats")
                    .child(Element::new("div").text(format!("Completion: {pct}%")))
                    .child(Element::new("div").text(format!("Tasks: {done}/{total}"))),
            )
            .child(progress_bar(pct))
            .child(Element::new("div").class("timestamp").text(format!(
                "Last updated: {}",
                format_timestamp(epic.str_field("lastUpdated"))
            )))
            .child(Element::new("div").class("memory-status").text(memory))
    });

    Element::new("div").class("epic-grid").children(cards).into()
}

/// Headline list
#[must_use]
pub fn render_news(records: &[Record]) -> Fragment {
    let items = records.iter().map(|item| {
        let title = plain_text(&text_or_placeholder(item, "title"), usize::MAX);
        let link = item
            .str_field("link")
            .filter(|l| !l.trim().is_empty())
            .unwrap_or("#");

        let mut el = Element::new("div").class("news-item");
        if let Some(image) = item.str_field("image").filter(|i| !i.trim().is_empty()) {
            el = el.child(
                Element::new("img")
                    .class("news-image")
                    .attr("src", image)
                    .attr("alt", title.clone()),
            );
        }

        el.child(
            Element::new("div").class("news-title").child(
                Element::new("a")
                    .attr("href", link)
                    .attr("target", "_blank")
                    .attr("rel", "noopener noreferrer")
                    .text(title),
            ),
        )
        .child(
            Element::new("div")
                .class("news-date")
                .text(text_or_placeholder(item, "date")),
        )
        .child(Element::new("div").class("news-description").text(plain_text(
            &text_or_placeholder(item, "description"),
            DESCRIPTION_LIMIT,
        )))
    });

    Element::new("div").class("news-list").children(items).into()
}

/// Indicator class for a job status
#[must_use]
pub fn job_status_class(status: Option<&str>) -> &'static str {
    match status {
        Some("failed") => "status-inactive",
        Some("warning") => "status-warning",
        _ => "status-active",
    }
}

fn system_card(title: &str, items: Vec<Element>) -> Element {
    Element::new("div")
        .class("system-card")
        .child(Element::new("div").class("system-title").text(title))
        .child(Element::new("div").class("system-items").children(items))
}

fn system_item(header: impl Into<Fragment>, details: Vec<Element>) -> Element {
    Element::new("div")
        .class("system-item")
        .child(Element::new("div").class("system-item-header").child(header))
        .child(Element::new("div").class("system-item-details").children(details))
}

fn status_text(text: impl Into<String>) -> Element {
    Element::new("div").class("status-text").text(text)
}

/// Job statistics and job list
#[must_use]
pub fn render_cron(records: &[Record]) -> Fragment {
    let active = records
        .iter()
        .filter(|job| job.str_field("status") != Some("failed"))
        .count();
    // Timestamps are `YYYY-MM-DD HH:MM:SS`, so string order is time order
    let last_run = records
        .iter()
        .filter(|job| job.str_field("lastRun").is_some())
        .max_by(|a, b| a.str_field("lastRun").cmp(&b.str_field("lastRun")))
        .map_or_else(|| PLACEHOLDER.to_string(), |job| text_or_placeholder(job, "id"));
    let next_run = records
        .iter()
        .filter(|job| job.str_field("nextRun").is_some())
        .min_by(|a, b| a.str_field("nextRun").cmp(&b.str_field("nextRun")))
        .map_or_else(|| PLACEHOLDER.to_string(), |job| text_or_placeholder(job, "id"));

    let overview = system_card(
        "📋 Cron Job Statistics",
        vec![system_item(
            status_text("Overview"),
            vec![
                labeled("Total Jobs", records.len().to_string()),
                labeled("Active Jobs", active.to_string()),
                labeled("Last Executed", last_run),
                labeled("Next Job", next_run),
            ],
        )],
    );

    let jobs = records
        .iter()
        .map(|job| {
            let status = job.str_field("status");
            let class = job_status_class(status);
            let header = Element::new("div")
                .class("job-header")
                .child(status_text(text_or_placeholder(job, "name")))
                .child(Element::new("div").class("status-indicator").class(class));

            system_item(
                header,
                vec![
                    labeled("ID", text_or_placeholder(job, "id")),
                    labeled("Schedule", text_or_placeholder(job, "schedule")),
                    labeled("Last Run", text_or_placeholder(job, "lastRun")),
                    labeled("Next Run", text_or_placeholder(job, "nextRun")),
                    labeled(
                        "Executions",
                        job.u64_field("executions").unwrap_or(0).to_string(),
                    ),
                    labeled(
                        "Status",
                        Element::new("span")
                            .class("status-label")
                            .class(class)
                            .text(status.map_or_else(|| PLACEHOLDER.to_string(), str::to_uppercase)),
                    ),
                ],
            )
        })
        .collect();

    Element::new("div")
        .class("system-grid")
        .child(overview)
        .child(system_card("⏰ Active Cron Jobs", jobs))
        .into()
}

fn resource_item(name: &str, resource: &Record, unit_fields: bool) -> Element {
    let pct = if unit_fields {
        percent_of(resource, "percent")
    } else {
        percent_of(resource, "usage")
    };

    let details = if unit_fields {
        vec![
            labeled("Used", format!("{} GB", text_or_num(resource, "used"))),
            labeled("Total", format!("{} GB", text_or_num(resource, "total"))),
            labeled("Usage", format!("{pct}%")),
        ]
    } else {
        vec![
            labeled("Usage", format!("{pct}%")),
            labeled("Cores", text_or_num(resource, "cores")),
            labeled("Model", text_or_placeholder(resource, "model")),
        ]
    };

    system_item(status_text(name), details).child(progress_bar(pct))
}

fn text_or_num(record: &Record, key: &str) -> String {
    record
        .get(key)
        .and_then(value_text)
        .unwrap_or_else(|| "0".to_string())
}

/// System overview from the first record
#[must_use]
pub fn render_system(records: &[Record]) -> Fragment {
    let snapshot = records.first().cloned().unwrap_or_default();
    let memory = snapshot.record_field("memory").unwrap_or_default();
    let cpu = snapshot.record_field("cpu").unwrap_or_default();
    let disk = snapshot.record_field("disk").unwrap_or_default();
    let network = snapshot.record_field("network").unwrap_or_default();

    let status = snapshot.str_field("status").unwrap_or("unknown");
    let status_class = if status == "operational" {
        "status-active"
    } else {
        "status-warning"
    };
    let mut status_label = status.to_string();
    if let Some(first) = status_label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    let overview = system_item(
        Element::new("div").class("status-text").text("Status: ").child(
            Element::new("span")
                .class(status_class)
                .text(format!("● {status_label}")),
        ),
        vec![
            labeled("Uptime", text_or_placeholder(&snapshot, "uptime")),
            labeled(
                "Last Update",
                format_timestamp(snapshot.str_field("timestamp")),
            ),
            labeled("Platform", text_or_placeholder(&snapshot, "platform")),
        ],
    );

    let services = snapshot.records_field("services");
    let service_rows = services.iter().flat_map(|service| {
        [
            Element::new("div")
                .class("service-row")
                .child(Element::new("span").text(text_or_placeholder(service, "name")))
                .child(
                    Element::new("span")
                        .class("service-status")
                        .text(text_or_placeholder(service, "status")),
                ),
            Element::new("div").class("service-uptime").text(format!(
                "Uptime: {}",
                text_or_placeholder(service, "uptime")
            )),
        ]
    });

    let resources = system_card(
        "📊 System Overview",
        vec![
            overview,
            resource_item("Memory", &memory, true),
            resource_item("CPU", &cpu, false),
            resource_item("Disk", &disk, true),
        ],
    );

    let connectivity = system_card(
        "🌐 Network & Services",
        vec![
            system_item(
                status_text("Network"),
                vec![
                    labeled("Download", text_or_placeholder(&network, "download")),
                    labeled("Upload", text_or_placeholder(&network, "upload")),
                    labeled("Status", text_or_placeholder(&network, "status")),
                ],
            ),
            Element::new("div")
                .class("system-item")
                .child(
                    Element::new("div")
                        .class("system-item-header")
                        .child(status_text("Services")),
                )
                .child(
                    Element::new("div")
                        .class("system-item-details")
                        .children(service_rows),
                ),
        ],
    );

    Element::new("div")
        .class("system-grid")
        .child(resources)
        .child(connectivity)
        .into()
}

/// Inline error affordance listing resolution warnings
#[must_use]
pub fn render_error(panel: PanelId, warnings: &[String]) -> Fragment {
    Element::new("div")
        .class("error")
        .text(format!("Error loading {}.", panel.title().to_lowercase()))
        .child(
            Element::new("ul").children(
                warnings
                    .iter()
                    .map(|w| Element::new("li").text(w.clone())),
            ),
        )
        .into()
}

/// Placeholder shown while a panel resolves
#[must_use]
pub fn render_loading(panel: PanelId) -> Fragment {
    Element::new("div")
        .class("loading")
        .text(format!("Loading {}...", panel.title().to_lowercase()))
        .into()
}

/// Full tabbed page: tab bar plus one container per panel
///
/// Only the active panel's container carries the `active` class. Panels
/// without a rendered body show the loading placeholder.
#[must_use]
pub fn render_page(tabs: &TabSet, bodies: &[(PanelId, Fragment)]) -> Fragment {
    let buttons = PanelId::ALL.iter().map(|&panel| {
        let mut button = Element::new("button")
            .class("tab-button")
            .attr("data-tab", panel.as_str())
            .text(panel.title());
        if tabs.is_visible(panel) {
            button = button.class("active");
        }
        button
    });

    let contents = PanelId::ALL.iter().map(|&panel| {
        let body = bodies
            .iter()
            .find(|(p, _)| *p == panel)
            .map_or_else(|| render_loading(panel), |(_, f)| f.clone());

        let mut content = Element::new("div").id(panel.as_str()).class("tab-content");
        if tabs.is_visible(panel) {
            content = content.class("active");
        }
        content.child(
            Element::new("div")
                .id(format!("{}-container", panel.as_str()))
                .child(body),
        )
    });

    Element::new("div")
        .class("dashboard")
        .child(Element::new("div").class("tab-bar").children(buttons))
        .children(contents)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_to_html_escapes() {
        let frag: Fragment = Element::new("a")
            .attr("href", "https://x.pt/?a=1&b=\"2\"")
            .text("<b>bold</b> & co")
            .into();
        assert_eq!(
            frag.to_html(),
            r#"<a href="https://x.pt/?a=1&amp;b=&quot;2&quot;">&lt;b&gt;bold&lt;/b&gt; &amp; co</a>"#
        );
    }

    #[test]
    fn test_void_elements() {
        let frag: Fragment = Element::new("img").class("news-image").attr("src", "a.png").into();
        assert_eq!(frag.to_html(), r#"<img class="news-image" src="a.png">"#);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text(r#"<p>Olá &amp; <b>bem-vindo</b></p>"#, 200),
            "Olá & bem-vindo"
        );
        assert_eq!(plain_text("broken <img src=\"x", 200), "broken");
        assert_eq!(plain_text("&#39;quoted&#x27; &quot;x&quot;", 200), "'quoted' \"x\"");
        assert_eq!(plain_text("abcdef", 3), "abc...");
        assert_eq!(plain_text("  lots   of\nspace ", 200), "lots of space");
    }

    #[test]
    fn test_completion_percent() {
        let epic = record(json!({ "tasksCompleted": 19, "totalTasks": 20 }));
        assert_eq!(completion_percent(&epic), 95);

        let epic = record(json!({ "tasksCompleted": 1, "totalTasks": 3 }));
        assert_eq!(completion_percent(&epic), 33);

        let epic = record(json!({ "tasksCompleted": 5, "totalTasks": 0 }));
        assert_eq!(completion_percent(&epic), 0);

        assert_eq!(completion_percent(&Record::new()), 0);
    }

    #[test]
    fn test_status_and_priority_classes() {
        assert_eq!(epic_status_class(Some("completed")), "status-success");
        assert_eq!(epic_status_class(Some("in-progress")), "status-warning");
        assert_eq!(epic_status_class(Some("blocked")), "status-info");
        assert_eq!(priority_class(Some("high")), "priority-high");
        assert_eq!(priority_class(Some("low")), "priority-low");
        assert_eq!(priority_class(None), "priority-medium");
        assert_eq!(job_status_class(Some("failed")), "status-inactive");
        assert_eq!(job_status_class(Some("warning")), "status-warning");
        assert_eq!(job_status_class(Some("success")), "status-active");
    }

    #[test]
    fn test_epics_render_defaults() {
        let frag = render_epics(&defaults::epics());
        assert_eq!(frag.find_by_class("epic-card").len(), 4);
        assert_eq!(frag.find_by_class("status-success").len(), 1);

        let fills = frag.find_by_class("progress-fill");
        assert_eq!(fills[0].attr_value("style"), Some("width: 95%"));
        assert!(frag.text_content().contains("💾 Persistent Memory: memory/"));
    }

    #[test]
    fn test_epic_with_missing_fields() {
        let frag = render_epics(&[record(json!({ "title": "Bare" }))]);
        let text = frag.text_content();
        assert!(text.contains("Bare"));
        assert!(text.contains("Due: —"));
        assert!(text.contains("Progress: 0% (0/0)"));
        assert!(text.contains("⏳ Temporary Memory"));
        assert_eq!(frag.find_by_class("status-info").len(), 1);
        assert_eq!(frag.find_by_class("priority-medium").len(), 1);
    }

    #[test]
    fn test_news_render() {
        let items = vec![
            record(json!({
                "title": "Com imagem",
                "description": "<p>Texto &amp; mais</p>",
                "date": "29 Jan 2026, 10:30",
                "link": "https://rtp.pt/noticias",
                "image": "https://cdn.rtp.pt/1.jpg",
            })),
            record(json!({ "title": "Sem imagem", "image": null })),
        ];
        let frag = render_news(&items);

        assert_eq!(frag.find_by_class("news-item").len(), 2);
        assert_eq!(frag.find_by_class("news-image").len(), 1);

        let descriptions = frag.find_by_class("news-description");
        assert_eq!(
            Fragment::Element(descriptions[0].clone()).text_content(),
            "Texto & mais"
        );

        let html = frag.to_html();
        assert!(html.contains(r##"<a href="#" target="_blank" rel="noopener noreferrer">Sem imagem</a>"##));
    }

    #[test]
    fn test_news_description_truncated() {
        let long = "palavra ".repeat(60);
        let frag = render_news(&[record(json!({ "description": long }))]);
        let text = Fragment::Element(frag.find_by_class("news-description")[0].clone()).text_content();
        assert!(text.ends_with("..."));
        assert!(text.chars().count() <= DESCRIPTION_LIMIT + 3);
    }

    #[test]
    fn test_cron_stats() {
        let frag = render_cron(&defaults::cron_jobs());
        let text = frag.text_content();
        assert!(text.contains("Total Jobs: 5"));
        assert!(text.contains("Active Jobs: 5"));
        assert!(text.contains("Last Executed: heartbeat_check"));
        assert!(text.contains("Next Job: weather_update"));
        assert_eq!(frag.find_by_class("status-indicator").len(), 5);
    }

    #[test]
    fn test_cron_failed_job() {
        let jobs = vec![
            record(json!({ "id": "a", "name": "A", "status": "failed" })),
            record(json!({ "id": "b", "name": "B", "status": "warning" })),
        ];
        let frag = render_cron(&jobs);
        assert!(frag.text_content().contains("Active Jobs: 1"));
        assert!(frag.text_content().contains("Last Executed: —"));
        assert_eq!(frag.find_by_class("status-inactive").len(), 2);
    }

    #[test]
    fn test_system_render() {
        let frag = render_system(&defaults::system());
        let text = frag.text_content();
        assert!(text.contains("● Operational"));
        assert!(text.contains("Used: 2.4 GB"));
        assert!(text.contains("Total: 16 GB"));
        assert!(text.contains("Model: Apple M2 Pro"));
        assert_eq!(frag.find_by_class("service-row").len(), 6);
        assert_eq!(frag.find_by_class("progress-fill").len(), 3);
    }

    #[test]
    fn test_system_render_empty_snapshot() {
        let frag = render_system(&[]);
        let text = frag.text_content();
        assert!(text.contains("● Unknown"));
        assert!(text.contains("Uptime: —"));
        assert!(text.contains("Used: 0 GB"));
    }

    #[test]
    fn test_error_affordance() {
        let frag = render_error(
            PanelId::News,
            &["cache miss".to_string(), "HTTP 500".to_string()],
        );
        assert_eq!(
            frag.to_html(),
            r#"<div class="error">Error loading news.<ul><li>cache miss</li><li>HTTP 500</li></ul></div>"#
        );
    }

    #[test]
    fn test_page_marks_one_active_panel() {
        let tabs = TabSet::new(PanelId::News);
        let page = render_page(&tabs, &[(PanelId::News, render_news(&defaults::news()))]);

        let active = page.find_by_class("active");
        assert_eq!(active.len(), 2);
        assert!(active.iter().any(|e| e.id.as_deref() == Some("news")));
        assert!(active
            .iter()
            .any(|e| e.attr_value("data-tab") == Some("news")));

        // Panels without a body show the loading placeholder
        assert_eq!(page.find_by_class("loading").len(), 3);
    }
}
