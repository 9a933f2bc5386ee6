use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use stockroom_core::config::{AppConfig, LoadOptions};
use stockroom_store::{JsonFileStorage, ProductCatalog};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_catalog_storage(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "catalog_storage",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
            checks.push(DoctorCheck {
                name: "catalog_integrity",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog_storage(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck {
                    name: "catalog_storage",
                    status: CheckStatus::Fail,
                    details: format!("failed to initialize async runtime: {error}"),
                },
                DoctorCheck {
                    name: "catalog_integrity",
                    status: CheckStatus::Skipped,
                    details: "skipped because the storage check could not run".to_string(),
                },
            ];
        }
    };

    let storage = Arc::new(JsonFileStorage::new(&config.catalog.path));
    match runtime.block_on(async {
        let catalog = ProductCatalog::load(storage).await?;
        Ok::<_, stockroom_core::errors::CatalogError>(catalog.get_all().await)
    }) {
        Ok(products) => {
            let storage_check = DoctorCheck {
                name: "catalog_storage",
                status: CheckStatus::Pass,
                details: format!(
                    "catalog at `{}` decoded with {} products",
                    config.catalog.path.display(),
                    products.len()
                ),
            };

            let codes: BTreeSet<&str> =
                products.iter().map(|product| product.code_value.as_str()).collect();
            let integrity_check = if codes.len() == products.len() {
                DoctorCheck {
                    name: "catalog_integrity",
                    status: CheckStatus::Pass,
                    details: format!("all {} code values are unique", products.len()),
                }
            } else {
                DoctorCheck {
                    name: "catalog_integrity",
                    status: CheckStatus::Fail,
                    details: format!(
                        "{} duplicate code values found in the stored catalog",
                        products.len() - codes.len()
                    ),
                }
            };

            vec![storage_check, integrity_check]
        }
        Err(error) => vec![
            DoctorCheck {
                name: "catalog_storage",
                status: CheckStatus::Fail,
                details: error.to_string(),
            },
            DoctorCheck {
                name: "catalog_integrity",
                status: CheckStatus::Skipped,
                details: "skipped because the catalog did not decode".to_string(),
            },
        ],
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];
    for check in &report.checks {
        let status = match check.status {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skipped",
        };
        lines.push(format!("- {}: {status} ({})", check.name, check.details));
    }
    lines.join("\n")
}

fn escape_json(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
