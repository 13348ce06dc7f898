use std::collections::BTreeMap;
use std::fmt;

/// Type of a parameter an event declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Boolean,
    Number,
    PositiveNumber,
    NumberArray,
    /// Index of a space on the board.
    Space,
    /// Any other type name; its value is passed through verbatim.
    Other(String),
}

impl std::str::FromStr for ParameterType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "Boolean" => ParameterType::Boolean,
            "Number" => ParameterType::Number,
            "PositiveNumber" => ParameterType::PositiveNumber,
            "NumberArray" => ParameterType::NumberArray,
            "Space" => ParameterType::Space,
            other => ParameterType::Other(other.to_owned()),
        })
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::Boolean => write!(f, "Boolean"),
            ParameterType::Number => write!(f, "Number"),
            ParameterType::PositiveNumber => write!(f, "PositiveNumber"),
            ParameterType::NumberArray => write!(f, "NumberArray"),
            ParameterType::Space => write!(f, "Space"),
            ParameterType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A parameter declaration, e.g. `Space|target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParameter {
    pub name: String,
    pub kind: ParameterType,
}

impl EventParameter {
    pub fn new(name: &str, kind: ParameterType) -> Self {
        Self {
            name: name.to_owned(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Boolean(bool),
    Number(i64),
    NumberArray(Vec<i64>),
    Space(u16),
    Text(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Boolean(value) => write!(f, "{}", u8::from(*value)),
            ParameterValue::Number(value) => write!(f, "{}", value),
            ParameterValue::NumberArray(values) => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", values.join(","))
            }
            ParameterValue::Space(index) => write!(f, "{}", index),
            ParameterValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Values a space assigns to its event's parameters, keyed by parameter name.
pub type ParameterValues = BTreeMap<String, ParameterValue>;

/// Express an absolute space index as `(chain index, index within chain)`.
pub fn decompose_space(chains: &[Vec<u16>], space: u16) -> Option<(usize, usize)> {
    chains.iter().enumerate().find_map(|(chain_index, chain)| {
        chain
            .iter()
            .position(|&s| s == space)
            .map(|chain_space_index| (chain_index, chain_space_index))
    })
}

fn define_label(name: &str, value: impl fmt::Display) -> String {
    format!(".definelabel {},{}", name, value)
}

/// Turn an event's parameters into `.definelabel` directives the event body can reference.
///
/// Directives come out in declaration order. Space parameters always get their
/// `_chain_index` / `_chain_space_index` companions, set to `-1` when no chain table is
/// available, so that bodies referencing them still assemble.
#[tracing::instrument(skip_all)]
pub fn make_parameter_symbol_labels(
    parameters: &[EventParameter],
    values: &ParameterValues,
    chains: Option<&[Vec<u16>]>,
) -> Vec<String> {
    let mut labels = Vec::new();

    for parameter in parameters {
        let name = parameter.name.as_str();
        let value = values.get(name);

        match &parameter.kind {
            ParameterType::Boolean => {
                let set = matches!(value, Some(ParameterValue::Boolean(true)));
                labels.push(define_label(name, u8::from(set)));
            }
            ParameterType::NumberArray => {}
            ParameterType::Space => {
                let space = match value {
                    Some(ParameterValue::Space(index)) => Some(*index),
                    Some(ParameterValue::Number(index)) => u16::try_from(*index).ok(),
                    _ => None,
                };
                if let Some(space) = space {
                    labels.push(define_label(name, space));
                }

                let (chain_index, chain_space_index) = chains
                    .zip(space)
                    .and_then(|(chains, space)| decompose_space(chains, space))
                    .map_or((-1, -1), |(c, s)| (c as i64, s as i64));
                labels.push(define_label(&format!("{}_chain_index", name), chain_index));
                labels.push(define_label(
                    &format!("{}_chain_space_index", name),
                    chain_space_index,
                ));
            }
            ParameterType::Number | ParameterType::PositiveNumber | ParameterType::Other(_) => {
                if let Some(value) = value {
                    labels.push(define_label(name, value));
                }
            }
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn chains() -> Vec<Vec<u16>> {
        vec![vec![10, 11, 12], vec![20, 21]]
    }

    #[test]
    fn test_decompose_space() {
        assert_eq!(decompose_space(&chains(), 21), Some((1, 1)));
        assert_eq!(decompose_space(&chains(), 10), Some((0, 0)));
        assert_eq!(decompose_space(&chains(), 5), None);
    }

    #[test]
    fn test_parameter_labels() {
        let parameters = vec![
            EventParameter::new("enabled", ParameterType::Boolean),
            EventParameter::new("disabled", ParameterType::Boolean),
            EventParameter::new("coins", ParameterType::Number),
            EventParameter::new("missing", ParameterType::PositiveNumber),
            EventParameter::new("list", ParameterType::NumberArray),
            EventParameter::new("target", ParameterType::Space),
            EventParameter::new("sound", ParameterType::Other("Audio".to_string())),
        ];
        let mut values = ParameterValues::new();
        values.insert("enabled".to_string(), ParameterValue::Boolean(true));
        values.insert("coins".to_string(), ParameterValue::Number(-5));
        values.insert("list".to_string(), ParameterValue::NumberArray(vec![1, 2]));
        values.insert("target".to_string(), ParameterValue::Space(21));
        values.insert("sound".to_string(), ParameterValue::Text("0x2A".to_string()));

        let chains = chains();
        let labels = make_parameter_symbol_labels(&parameters, &values, Some(chains.as_slice()));
        assert_eq!(
            labels,
            vec![
                ".definelabel enabled,1",
                ".definelabel disabled,0",
                ".definelabel coins,-5",
                ".definelabel target,21",
                ".definelabel target_chain_index,1",
                ".definelabel target_chain_space_index,1",
                ".definelabel sound,0x2A",
            ]
        );
        // Output is a pure function of its inputs.
        assert_eq!(
            make_parameter_symbol_labels(&parameters, &values, Some(chains.as_slice())),
            labels
        );
    }

    #[test]
    fn test_space_without_chains() {
        let parameters = vec![
            EventParameter::new("X", ParameterType::Space),
            EventParameter::new("Y", ParameterType::Space),
        ];
        let mut values = ParameterValues::new();
        values.insert("X".to_string(), ParameterValue::Space(21));

        let labels = make_parameter_symbol_labels(&parameters, &values, None);
        assert_eq!(
            labels,
            vec![
                ".definelabel X,21",
                ".definelabel X_chain_index,-1",
                ".definelabel X_chain_space_index,-1",
                ".definelabel Y_chain_index,-1",
                ".definelabel Y_chain_space_index,-1",
            ]
        );
    }
}
