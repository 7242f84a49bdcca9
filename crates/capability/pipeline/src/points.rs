//! 点位合并。
//!
//! 结果集合由本次载荷的点位编码决定；载荷未提供的 value / units / state
//! 从已有点位沿用。

use domain::{Point, PointMeta, PointReading};
use std::collections::BTreeMap;

/// 合并本次 pointset 载荷与已有点位列表，按点位编码排序输出。
pub fn merge_points(
    incoming: &BTreeMap<String, PointReading>,
    existing: Option<&[Point]>,
) -> Vec<Point> {
    let existing = existing.unwrap_or_default();
    incoming
        .iter()
        .map(|(code, reading)| {
            let previous = existing.iter().find(|point| &point.id == code);
            merge_point(code, reading, previous)
        })
        .collect()
}

fn merge_point(code: &str, reading: &PointReading, previous: Option<&Point>) -> Point {
    let value = reading
        .present_value_text()
        .or_else(|| previous.and_then(|point| point.value.clone()));
    let units = non_empty(reading.units.clone())
        .or_else(|| previous.and_then(|point| point.units.clone()));
    let state = non_empty(reading.value_state.clone())
        .or_else(|| previous.and_then(|point| point.state.clone()));
    Point {
        id: code.to_string(),
        name: code.to_string(),
        value,
        meta: Some(PointMeta {
            code: Some(code.to_string()),
            units: units.clone(),
        }),
        units,
        state,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
