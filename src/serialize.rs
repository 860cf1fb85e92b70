//! Text encodings for the two result fields.
//!
//! Parameters are written as pretty JSON with two-space indentation and the
//! original key order. Trajectories go through a [`TrajectorySerializer`];
//! the default one writes tab-separated rows.

use crate::result::Trajectory;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt::Write;

/// Encode simulation parameters as human-readable JSON.
pub fn serialize_params(params: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(params)?)
}

/// Decode text produced by [`serialize_params`].
pub fn parse_params(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Renders a trajectory as tabular text.
///
/// Implementations must be deterministic: the same trajectory always yields
/// byte-identical output, with the same column count on every row.
pub trait TrajectorySerializer: Send + Sync {
    fn serialize(&self, trajectory: &Trajectory) -> Result<String>;
}

/// Tab-separated rows: a `time` header followed by the trajectory columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvTrajectorySerializer;

impl TrajectorySerializer for TsvTrajectorySerializer {
    fn serialize(&self, trajectory: &Trajectory) -> Result<String> {
        if let Some(bad) = trajectory
            .columns
            .iter()
            .find(|c| c.contains('\t') || c.contains('\n') || c.contains('\r'))
        {
            return Err(Error::SerializationError(format!(
                "column name {:?} contains a field separator",
                bad
            )));
        }

        let mut out = String::from("time");
        for column in &trajectory.columns {
            out.push('\t');
            out.push_str(column);
        }
        out.push('\n');

        for (row, point) in trajectory.points.iter().enumerate() {
            if point.values.len() != trajectory.columns.len() {
                return Err(Error::SerializationError(format!(
                    "row {} has {} values, expected {}",
                    row,
                    point.values.len(),
                    trajectory.columns.len()
                )));
            }
            // Writing into a String cannot fail.
            let _ = write!(out, "{}", point.time);
            for value in &point.values {
                let _ = write!(out, "\t{}", value);
            }
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::TrajectoryPoint;
    use serde_json::json;

    fn trajectory() -> Trajectory {
        Trajectory {
            columns: vec!["susceptible".into(), "infectious".into()],
            points: vec![
                TrajectoryPoint {
                    time: 0.0,
                    values: vec![999.0, 1.0],
                },
                TrajectoryPoint {
                    time: 0.5,
                    values: vec![998.25, 1.75],
                },
            ],
        }
    }

    #[test]
    fn params_use_two_space_indent_and_keep_key_order() {
        let params = json!({"zeta": 1, "alpha": {"r0": 2.5}});
        let text = serialize_params(&params).unwrap();
        assert_eq!(text, "{\n  \"zeta\": 1,\n  \"alpha\": {\n    \"r0\": 2.5\n  }\n}");
        assert_eq!(parse_params(&text).unwrap(), params);
    }

    #[test]
    fn tsv_has_header_and_consistent_columns() {
        let text = TsvTrajectorySerializer.serialize(&trajectory()).unwrap();
        assert_eq!(
            text,
            "time\tsusceptible\tinfectious\n0\t999\t1\n0.5\t998.25\t1.75\n"
        );
        for line in text.lines() {
            assert_eq!(line.split('\t').count(), 3);
        }
    }

    #[test]
    fn tsv_is_deterministic() {
        let a = TsvTrajectorySerializer.serialize(&trajectory()).unwrap();
        let b = TsvTrajectorySerializer.serialize(&trajectory()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut t = trajectory();
        t.points[1].values.pop();
        let err = TsvTrajectorySerializer.serialize(&t).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 values, expected 2"));
    }

    #[test]
    fn separators_in_column_names_are_rejected() {
        let mut t = trajectory();
        t.columns[0] = "a\tb".into();
        assert!(TsvTrajectorySerializer.serialize(&t).is_err());
    }
}
