// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::api::UpscalingInfo;
use crate::error::ProfileError;

/// One registered scaling rule: which value columns it touches and how the
/// scale is computed.
#[derive(Clone, Debug)]
pub struct UpscalingRule {
    upscaling_info: UpscalingInfo,
    values_offset: Vec<usize>,
}

impl UpscalingRule {
    pub fn compute_scale(&self, values: &[i64]) -> f64 {
        match self.upscaling_info {
            UpscalingInfo::Poisson {
                sum_value_offset,
                count_value_offset,
                sampling_distance,
            } => {
                // This should not happen, but if it happens, do not upscale.
                if values[sum_value_offset] == 0 || values[count_value_offset] == 0 {
                    return 1_f64;
                }

                let avg = values[sum_value_offset] as f64 / values[count_value_offset] as f64;
                1_f64 / (1_f64 - (-avg / sampling_distance as f64).exp())
            }
            UpscalingInfo::Proportional { scale } => scale,
        }
    }
}

/// The scaling rules of one profile kind. Both encoders apply the same rules
/// to each sample's values, which is what keeps their decoded magnitudes
/// identical.
#[derive(Clone, Debug, Default)]
pub struct UpscalingRules {
    rules: Vec<UpscalingRule>,
}

impl UpscalingRules {
    pub fn add(
        &mut self,
        values_offset: &[usize],
        upscaling_info: UpscalingInfo,
        value_count: usize,
    ) -> Result<(), ProfileError> {
        if values_offset.is_empty() {
            return Err(ProfileError::configuration(
                "upscaling rules must target at least one value column",
            ));
        }
        if values_offset.iter().any(|offset| *offset >= value_count) {
            return Err(ProfileError::configuration(
                "upscaling rule targets a value column that doesn't exist",
            ));
        }
        // Two rules scaling the same column would make the result depend on
        // rule order.
        if values_offset.iter().any(|offset| {
            self.rules
                .iter()
                .any(|rule| rule.values_offset.contains(offset))
        }) {
            return Err(ProfileError::configuration(
                "upscaling rules must not overlap on a value column",
            ));
        }
        upscaling_info.check_validity(value_count)?;

        let mut values_offset = values_offset.to_vec();
        values_offset.sort_unstable();
        self.rules.push(UpscalingRule {
            upscaling_info,
            values_offset,
        });
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn upscale_values(&self, values: &mut [i64]) {
        for rule in &self.rules {
            let scale = rule.compute_scale(values);
            for offset in &rule.values_offset {
                values[*offset] = (values[*offset] as f64 * scale).round() as i64;
            }
        }
    }
}
