//! Synthetic HR Dataset Generator
//!
//! Writes a CSV with the IBM HR attrition schema for local runs of the engine.
//! Attrition is drawn from a logistic model of the usual risk factors, so the
//! trained classifier has real signal to find.
//!
//! Usage: generate-dataset [OUTPUT] [COUNT] [SEED]

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

/// One employee row, in dataset column order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmployeeRecord {
    age: u32,
    attrition: &'static str,
    business_travel: &'static str,
    department: &'static str,
    distance_from_home: u32,
    education: u32,
    education_field: &'static str,
    employee_count: u32,
    employee_number: u32,
    environment_satisfaction: u32,
    gender: &'static str,
    job_involvement: u32,
    job_level: u32,
    job_role: &'static str,
    job_satisfaction: u32,
    marital_status: &'static str,
    monthly_income: u32,
    num_companies_worked: u32,
    over18: &'static str,
    over_time: &'static str,
    percent_salary_hike: u32,
    standard_hours: u32,
    total_working_years: u32,
    work_life_balance: u32,
    years_at_company: u32,
}

/// Seeded employee generator
struct EmployeeGenerator {
    rng: ChaCha8Rng,
    employee_counter: u32,
}

impl EmployeeGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            employee_counter: 0,
        }
    }

    fn generate(&mut self) -> EmployeeRecord {
        self.employee_counter += 1;

        let department = self.weighted_choice(&[
            ("Research & Development", 65),
            ("Sales", 30),
            ("Human Resources", 5),
        ]);
        let job_role = match department {
            "Sales" => self.weighted_choice(&[
                ("Sales Executive", 70),
                ("Sales Representative", 18),
                ("Manager", 12),
            ]),
            "Human Resources" => self.weighted_choice(&[("Human Resources", 80), ("Manager", 20)]),
            _ => self.weighted_choice(&[
                ("Research Scientist", 30),
                ("Laboratory Technician", 27),
                ("Manufacturing Director", 15),
                ("Healthcare Representative", 13),
                ("Research Director", 8),
                ("Manager", 7),
            ]),
        };

        let age: u32 = self.rng.gen_range(18..=60);
        let job_level = match job_role {
            "Manager" | "Research Director" => self.rng.gen_range(4..=5),
            "Sales Representative" | "Laboratory Technician" | "Research Scientist" => {
                self.rng.gen_range(1..=2)
            }
            _ => self.rng.gen_range(2..=3),
        };
        let monthly_income = 1000 * job_level * 2 + self.rng.gen_range(0..3000);
        let total_working_years = self.rng.gen_range(0..=(age - 18));
        let years_at_company = self.rng.gen_range(0..=total_working_years);
        let distance_from_home = self.rng.gen_range(1..=29);
        let over_time = self.weighted_choice(&[("No", 72), ("Yes", 28)]);
        let marital_status =
            self.weighted_choice(&[("Married", 46), ("Single", 32), ("Divorced", 22)]);
        let business_travel = self.weighted_choice(&[
            ("Travel_Rarely", 71),
            ("Travel_Frequently", 19),
            ("Non-Travel", 10),
        ]);

        let mut score: f64 = -2.6;
        score += if age < 30 { 0.9 } else { 0.0 };
        score += if monthly_income < 4000 { 0.8 } else { -0.3 };
        score += if years_at_company <= 2 { 0.7 } else { 0.0 };
        score += if distance_from_home > 10 { 0.4 } else { 0.0 };
        score += if over_time == "Yes" { 1.4 } else { 0.0 };
        score += if marital_status == "Single" { 0.6 } else { 0.0 };
        score += match business_travel {
            "Travel_Frequently" => 0.7,
            "Non-Travel" => -0.5,
            _ => 0.0,
        };
        score += match job_role {
            "Sales Representative" | "Laboratory Technician" => 0.6,
            "Manager" | "Research Director" => -0.8,
            _ => 0.0,
        };
        let p_leave = 1.0 / (1.0 + (-score).exp());
        let attrition = if self.rng.gen_bool(p_leave) { "Yes" } else { "No" };

        EmployeeRecord {
            age,
            attrition,
            business_travel,
            department,
            distance_from_home,
            education: self.rng.gen_range(1..=5),
            education_field: self.weighted_choice(&[
                ("Life Sciences", 41),
                ("Medical", 32),
                ("Marketing", 11),
                ("Technical Degree", 9),
                ("Other", 5),
                ("Human Resources", 2),
            ]),
            employee_count: 1,
            employee_number: self.employee_counter,
            environment_satisfaction: self.rng.gen_range(1..=4),
            gender: self.weighted_choice(&[("Male", 60), ("Female", 40)]),
            job_involvement: self.rng.gen_range(1..=4),
            job_level,
            job_role,
            job_satisfaction: self.rng.gen_range(1..=4),
            marital_status,
            monthly_income,
            num_companies_worked: self.rng.gen_range(0..=9),
            over18: "Y",
            over_time,
            percent_salary_hike: self.rng.gen_range(11..=25),
            standard_hours: 80,
            total_working_years,
            work_life_balance: self.rng.gen_range(1..=4),
            years_at_company,
        }
    }

    fn weighted_choice(&mut self, choices: &[(&'static str, u32)]) -> &'static str {
        let total: u32 = choices.iter().map(|(_, w)| w).sum();
        let mut pick = self.rng.gen_range(0..total);
        for (value, weight) in choices {
            if pick < *weight {
                return *value;
            }
            pick -= weight;
        }
        choices[choices.len() - 1].0
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_dataset=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let output = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("HR-Employee-Attrition.csv");
    let count: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1470);
    let seed: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(42);

    info!(output = %output, count, seed, "Generating synthetic HR dataset");

    let mut writer =
        csv::Writer::from_path(output).with_context(|| format!("Failed to create {output}"))?;
    let mut generator = EmployeeGenerator::new(seed);
    let mut resigned = 0u32;

    for _ in 0..count {
        let record = generator.generate();
        if record.attrition == "Yes" {
            resigned += 1;
        }
        writer.serialize(&record)?;
    }
    writer.flush()?;

    info!(
        rows = count,
        resigned,
        attrition_rate = format!("{:.2}%", resigned as f64 / count.max(1) as f64 * 100.0),
        "Dataset written"
    );

    Ok(())
}
