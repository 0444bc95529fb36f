//! Load descriptor types
//!
//! A load descriptor is the ordered list of marker launches for one run.
//! It is built in code, read from the config file, or loaded from a
//! YAML/JSON descriptor file, and is always handed to the executor
//! explicitly.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::common::{Error, Result};

/// Seconds of runtime per additional expected detection
const DETECTION_INTERVAL_SECS: u64 = 60;

/// One scheduled invocation of the workload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadItem {
    /// Seconds to wait after the previous launch
    pub pre_delay: u64,
    /// Seconds the workload runs for
    pub duration: u64,
    /// Number of detections the agent is expected to report
    pub expected_count: u32,
    /// Unique identifier passed to the workload
    pub tag: String,
}

impl LoadItem {
    pub fn new(pre_delay: u64, duration: u64, expected_count: u32, tag: impl Into<String>) -> Self {
        Self {
            pre_delay,
            duration,
            expected_count,
            tag: tag.into(),
        }
    }

    pub fn pre_delay(&self) -> Duration {
        Duration::from_secs(self.pre_delay)
    }
}

/// Expected detection count for a workload running `duration` seconds
///
/// Starts at 1 and increments for every full minute of runtime.
pub fn expected_detections(duration: u64) -> u32 {
    u32::try_from(duration / DETECTION_INTERVAL_SECS)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// An ordered list of launch items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDescriptor {
    pub items: Vec<LoadItem>,
}

/// On-disk descriptor layouts: either `items: [...]` or a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorFile {
    Wrapped { items: Vec<LoadItem> },
    Bare(Vec<LoadItem>),
}

impl LoadDescriptor {
    pub fn new(items: Vec<LoadItem>) -> Self {
        Self { items }
    }

    /// The reference load: three overlapping markers
    pub fn reference() -> Self {
        Self::new(vec![
            LoadItem::new(0, 61, 2, "0-61"),
            LoadItem::new(10, 59, 1, "10-59"),
            LoadItem::new(20, 1, 1, "30-1"),
        ])
    }

    /// Build a descriptor from `(pre_delay, duration)` pairs
    ///
    /// Tags take the form `<cumulative-delay>-<duration>` and expected
    /// counts follow [`expected_detections`].
    pub fn from_plan(plan: &[(u64, u64)]) -> Result<Self> {
        let mut cumulative = 0u64;
        let mut items = Vec::with_capacity(plan.len());
        for &(pre_delay, duration) in plan {
            cumulative = cumulative
                .checked_add(pre_delay)
                .ok_or_else(|| Error::InvalidDescriptor("cumulative delay overflows".to_string()))?;
            items.push(LoadItem::new(
                pre_delay,
                duration,
                expected_detections(duration),
                format!("{}-{}", cumulative, duration),
            ));
        }
        Ok(Self::new(items))
    }

    /// Parse `DELAY:DURATION` pairs into a descriptor via [`LoadDescriptor::from_plan`]
    pub fn parse_plan<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let plan = pairs
            .iter()
            .map(|pair| {
                let pair = pair.as_ref();
                let parsed: Option<(u64, u64)> = pair.split_once(':').and_then(|(d, r)| {
                    Some((d.trim().parse().ok()?, r.trim().parse().ok()?))
                });
                parsed.ok_or_else(|| {
                    Error::InvalidDescriptor(format!(
                        "'{}' is not DELAY:DURATION in whole seconds",
                        pair
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let descriptor = Self::from_plan(&plan)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Load a descriptor from a YAML or JSON file
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed: DescriptorFile = if is_json {
            serde_json::from_str(&content).map_err(|e| {
                Error::InvalidDescriptor(format!("{}: {}", path.display(), e))
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                Error::InvalidDescriptor(format!("{}: {}", path.display(), e))
            })?
        };

        let items = match parsed {
            DescriptorFile::Wrapped { items } | DescriptorFile::Bare(items) => items,
        };
        let descriptor = Self::new(items);
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the descriptor can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::InvalidDescriptor("no load items".to_string()));
        }

        let mut seen = HashSet::new();
        for (i, item) in self.items.iter().enumerate() {
            if item.tag.trim().is_empty() {
                return Err(Error::InvalidDescriptor(format!("item {} has an empty tag", i)));
            }
            if item.expected_count == 0 {
                return Err(Error::InvalidDescriptor(format!(
                    "item '{}' expects zero detections; counts start at 1",
                    item.tag
                )));
            }
            if !seen.insert(item.tag.as_str()) {
                return Err(Error::InvalidDescriptor(format!(
                    "duplicate tag '{}'",
                    item.tag
                )));
            }
        }
        self.schedule().map(|_| ())
    }

    /// Absolute launch offsets from the start of the run
    ///
    /// Offset n is the sum of pre-delays of items 0..=n.
    pub fn schedule(&self) -> Result<Vec<Duration>> {
        let mut at = Duration::ZERO;
        self.items
            .iter()
            .map(|item| {
                at = at.checked_add(item.pre_delay()).ok_or_else(|| {
                    Error::InvalidDescriptor(format!(
                        "launch time of '{}' overflows the schedule",
                        item.tag
                    ))
                })?;
                Ok(at)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reference_descriptor() {
        let descriptor = LoadDescriptor::reference();
        assert_eq!(descriptor.len(), 3);
        assert_eq!(descriptor.items[0], LoadItem::new(0, 61, 2, "0-61"));
        assert_eq!(descriptor.items[2].tag, "30-1");
        descriptor.validate().unwrap();
    }

    #[test]
    fn test_from_plan_matches_reference() {
        let planned = LoadDescriptor::from_plan(&[(0, 61), (10, 59), (20, 1)]).unwrap();
        assert_eq!(planned, LoadDescriptor::reference());
    }

    #[test]
    fn test_expected_detections() {
        assert_eq!(expected_detections(0), 1);
        assert_eq!(expected_detections(59), 1);
        assert_eq!(expected_detections(60), 2);
        assert_eq!(expected_detections(61), 2);
        assert_eq!(expected_detections(180), 4);
    }

    #[test]
    fn test_schedule_is_cumulative() {
        let schedule = LoadDescriptor::reference().schedule().unwrap();
        assert_eq!(
            schedule,
            vec![
                Duration::from_secs(0),
                Duration::from_secs(10),
                Duration::from_secs(30)
            ]
        );
    }

    #[test]
    fn test_parse_plan() {
        let descriptor = LoadDescriptor::parse_plan(&["0:61", "10:59", " 20 : 1 "]).unwrap();
        assert_eq!(descriptor, LoadDescriptor::reference());

        for bad in ["10", "a:1", "1:-2", ":"] {
            assert!(
                matches!(
                    LoadDescriptor::parse_plan(&[bad]),
                    Err(Error::InvalidDescriptor(_))
                ),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_overflowing_delays_rejected() {
        let descriptor = LoadDescriptor::new(vec![
            LoadItem::new(u64::MAX, 1, 1, "a"),
            LoadItem::new(u64::MAX, 1, 1, "b"),
        ]);
        assert!(matches!(
            descriptor.schedule(),
            Err(Error::InvalidDescriptor(_))
        ));
        assert!(matches!(
            descriptor.validate(),
            Err(Error::InvalidDescriptor(_))
        ));
        assert!(matches!(
            LoadDescriptor::from_plan(&[(u64::MAX, 1), (1, 1)]),
            Err(Error::InvalidDescriptor(_))
        ));

        let far = LoadDescriptor::new(vec![LoadItem::new(u64::MAX, 1, 1, "far")]);
        assert_eq!(far.schedule().unwrap(), vec![Duration::from_secs(u64::MAX)]);
    }

    #[test]
    fn test_validate_rejects_duplicate_tags() {
        let descriptor = LoadDescriptor::new(vec![
            LoadItem::new(0, 1, 1, "a"),
            LoadItem::new(0, 1, 1, "a"),
        ]);
        let err = descriptor.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate tag 'a'"));
    }

    #[test]
    fn test_validate_rejects_zero_count_and_empty() {
        let zero = LoadDescriptor::new(vec![LoadItem::new(0, 1, 0, "a")]);
        assert!(matches!(zero.validate(), Err(Error::InvalidDescriptor(_))));

        let empty = LoadDescriptor::new(vec![]);
        assert!(matches!(empty.validate(), Err(Error::InvalidDescriptor(_))));

        let blank = LoadDescriptor::new(vec![LoadItem::new(0, 1, 1, " ")]);
        assert!(matches!(blank.validate(), Err(Error::InvalidDescriptor(_))));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("load.yaml");
        std::fs::write(
            &path,
            concat!(
                "items:\n",
                "  - pre_delay: 0\n    duration: 5\n    expected_count: 1\n    tag: \"0-5\"\n",
                "  - pre_delay: 2\n    duration: 3\n    expected_count: 1\n    tag: \"2-3\"\n",
            ),
        )
        .unwrap();

        let descriptor = LoadDescriptor::from_file(&path).unwrap();
        assert_eq!(descriptor.len(), 2);
        assert_eq!(descriptor.items[1], LoadItem::new(2, 3, 1, "2-3"));
    }

    #[test]
    fn test_from_bare_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("load.json");
        std::fs::write(
            &path,
            r#"[{"pre_delay": 1, "duration": 2, "expected_count": 1, "tag": "1-2"}]"#,
        )
        .unwrap();

        let descriptor = LoadDescriptor::from_file(&path).unwrap();
        assert_eq!(descriptor.items, vec![LoadItem::new(1, 2, 1, "1-2")]);
    }

    #[test]
    fn test_from_file_validates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("load.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            LoadDescriptor::from_file(&path),
            Err(Error::InvalidDescriptor(_))
        ));
    }
}
