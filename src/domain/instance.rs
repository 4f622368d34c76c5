//! Data instances attached to hierarchy nodes, and the centroid over them.

use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

/// One data point of a clustering result.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Optional instance label
    pub name: Option<String>,
    /// Optional ground-truth class
    pub class: Option<String>,
    /// Feature values
    pub values: Vec<f64>,
}

impl Instance {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            name: None,
            class: None,
            values,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        write!(f, "{:?}", self.values)
    }
}

/// Arithmetic mean of the value vectors, `None` when there are no instances.
///
/// Dimensionality is taken from the first instance; input loading guarantees
/// all instances of one hierarchy share it.
pub fn mean_centroid<'a, I>(instances: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a Instance>,
{
    let mut sum: Option<Vec<f64>> = None;
    let mut count = 0usize;

    for instance in instances {
        let acc = sum.get_or_insert_with(|| vec![0.0; instance.dimensions()]);
        for (a, v) in acc.iter_mut().zip(&instance.values) {
            *a += v;
        }
        count += 1;
    }

    sum.map(|mut acc| {
        for a in acc.iter_mut() {
            *a /= count as f64;
        }
        acc
    })
}

/// Column layout of a delimited instance file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFormat {
    pub delimiter: char,
    /// Second column holds the instance class
    pub class_column: bool,
    /// Column after id (and class) holds the instance name
    pub name_column: bool,
    /// First non-comment line is a header
    pub skip_header: bool,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            class_column: false,
            name_column: false,
            skip_header: false,
        }
    }
}

/// A single parsed line: the owning node id (unparsed) and its instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub node_id: String,
    pub instance: Instance,
}

impl InstanceRecord {
    /// Parse one data line. `line_no` is 1-based and only used for error reporting.
    pub fn parse(line: &str, line_no: usize, format: &InputFormat) -> DomainResult<Self> {
        let mut fields = line.split(format.delimiter).map(str::trim);

        let node_id = match fields.next() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(DomainError::InvalidRecord {
                    line: line_no,
                    message: "missing node id".into(),
                })
            }
        };

        let mut take_label = |what: &str| -> DomainResult<Option<String>> {
            match fields.next() {
                Some(value) if !value.is_empty() => Ok(Some(value.to_string())),
                Some(_) => Ok(None),
                None => Err(DomainError::InvalidRecord {
                    line: line_no,
                    message: format!("missing {} column", what),
                }),
            }
        };
        let class = if format.class_column {
            take_label("class")?
        } else {
            None
        };
        let name = if format.name_column {
            take_label("name")?
        } else {
            None
        };

        let values = fields
            .map(|field| {
                field.parse::<f64>().map_err(|_| DomainError::InvalidRecord {
                    line: line_no,
                    message: format!("'{}' is not a number", field),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            node_id,
            instance: Instance {
                name,
                class,
                values,
            },
        })
    }
}

/// Parse every data line of `content`, enforcing one dimensionality across records.
pub fn parse_records(content: &str, format: &InputFormat) -> DomainResult<Vec<InstanceRecord>> {
    let mut records = Vec::new();
    let mut expected: Option<usize> = None;
    let mut header_pending = format.skip_header;

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        let line_no = idx + 1;
        let record = InstanceRecord::parse(trimmed, line_no, format)?;
        let found = record.instance.dimensions();
        match expected {
            Some(expected) if expected != found => {
                return Err(DomainError::DimensionMismatch {
                    line: line_no,
                    expected,
                    found,
                });
            }
            None => expected = Some(found),
            _ => {}
        }
        records.push(record);
    }

    Ok(records)
}
