use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Part of a decoded benchmark name a plot axis is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ParamKind {
    /// no name component, every record has an empty label
    #[default]
    Empty,
    /// `/`-separated trailing segments
    Argument,
    /// comma separated tags inside the first `<...>`
    Template,
}

impl ParamKind {
    /// human label for the component at `index`, e.g. "Argument 1"
    pub fn axis_label(self, index: usize) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Argument => format!("Argument {}", index + 1),
            Self::Template => format!("Template {}", index + 1),
        }
    }
}

/// A benchmark name split into its family, template tags and arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DecodedName {
    pub base_name: String,
    pub templates: Vec<String>,
    pub arguments: Vec<String>,
}

impl DecodedName {
    /// all components of the given kind, empty for `ParamKind::Empty`
    pub fn components(&self, kind: ParamKind) -> &[String] {
        match kind {
            ParamKind::Empty => &[],
            ParamKind::Argument => &self.arguments,
            ParamKind::Template => &self.templates,
        }
    }

    /// label at `index`, or "" when the name has fewer components
    pub fn param(&self, kind: ParamKind, index: usize) -> &str {
        self.components(kind)
            .get(index)
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl fmt::Display for DecodedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)?;
        if !self.templates.is_empty() {
            write!(f, "<{}>", self.templates.join(","))?;
        }
        for argument in self.arguments.iter() {
            write!(f, "/{argument}")?;
        }

        Ok(())
    }
}

/// Decode `base['<'tag(','tag)*'>']('/'arg)*`
///
/// Commas nested inside inner angle brackets do not split the tag list, so
/// `Foo<int,pair<int,int>>/8` has the two tags `int` and `pair<int,int>`.
pub fn decode(raw: &str) -> Result<DecodedName, AnalysisError> {
    let name = raw.trim();
    let split = name.find(&['<', '/'][..]).unwrap_or(name.len());
    let base_name = name[..split].trim();

    if base_name.is_empty() {
        return Err(AnalysisError::malformed(raw, "missing base name"));
    }

    let mut rest = &name[split..];
    let mut templates = Vec::new();

    if rest.starts_with('<') {
        let close = matching_bracket(rest)
            .ok_or_else(|| AnalysisError::malformed(raw, "unbalanced template brackets"))?;
        templates = split_templates(&rest[1..close]);
        rest = &rest[close + 1..];
    }

    let arguments = if rest.is_empty() {
        Vec::new()
    } else if let Some(arguments) = rest.strip_prefix('/') {
        arguments.split('/').map(str::to_owned).collect()
    } else {
        return Err(AnalysisError::malformed(
            raw,
            "unexpected characters after the template list",
        ));
    };

    Ok(DecodedName {
        base_name: base_name.to_owned(),
        templates,
        arguments,
    })
}

/// byte offset of the `>` closing the `<` that starts `input`
fn matching_bracket(input: &str) -> Option<usize> {
    let mut depth = 0usize;

    for (offset, character) in input.char_indices() {
        match character {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// split a template list on the commas at bracket depth 0
pub fn split_templates(list: &str) -> Vec<String> {
    if list.trim().is_empty() {
        return Vec::new();
    }

    let mut tags = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (offset, character) in list.char_indices() {
        match character {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tags.push(list[start..offset].trim().to_owned());
                start = offset + 1;
            }
            _ => {}
        }
    }
    tags.push(list[start..].trim().to_owned());

    tags
}

/// Numeric interpretation state of one plot axis
///
/// Shared by every call to `param_value` for the same axis of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisScale {
    /// symbolic axis title discovered while reading the labels
    pub custom_name: Option<String>,
    /// false once a label could not be read as a number
    pub is_numeric: bool,
}

impl Default for AxisScale {
    fn default() -> Self {
        Self {
            custom_name: None,
            is_numeric: true,
        }
    }
}

impl AxisScale {
    pub fn new() -> Self {
        Self::default()
    }

    /// axis title, preferring a discovered custom name on template axes
    pub fn title(&self, kind: ParamKind, index: usize) -> String {
        match (kind, &self.custom_name) {
            (ParamKind::Template, Some(name)) if !name.is_empty() => name.clone(),
            _ => kind.axis_label(index),
        }
    }
}

/// Position of `label` on a continuous axis
///
/// Numbers plot at their value. A `name:value` or `name=value` label plots at
/// its value and names the axis. Anything else marks the axis as symbolic the
/// first time, remembers the label as the axis title, and plots at the next
/// ordinal taken from `fallback`.
pub fn param_value(label: &str, scale: &mut AxisScale, fallback: &mut f64) -> f64 {
    if let Some(value) = parse_number(label) {
        return value;
    }

    if scale.is_numeric {
        if let Some((name, value)) = named_value(label) {
            scale.custom_name.get_or_insert_with(|| name.to_owned());

            return value;
        }

        scale.is_numeric = false;
        scale.custom_name.get_or_insert_with(|| label.to_owned());
    }

    let value = *fallback;
    *fallback += 1.0;

    value
}

fn parse_number(label: &str) -> Option<f64> {
    label
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn named_value(label: &str) -> Option<(&str, f64)> {
    let (name, value) = label.rsplit_once(&[':', '='][..])?;
    let name = name.trim();

    if name.is_empty() {
        None
    } else {
        parse_number(value).map(|value| (name, value))
    }
}
