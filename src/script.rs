//! The diagnoses EDA notebook.
//!
//! The notebook is a fixed list of steps: a title, the imports, then one markdown heading per
//! section followed by its code. The code is pandas/seaborn source for the notebook's Python
//! kernel. It is stored as text and never looked at by this crate, apart from the load cell which
//! gets the data directory spliced in.
use crate::notebook::{
    build_document, make_code_cell, make_markdown_cell, Cell, Document, Metadata,
};

/// Where the generated notebook looks for the MIMIC-III csv files unless told otherwise.
pub const DEFAULT_DATA_DIR: &str = "./mimic-iii-clinical-database-1.4/";

/// The number of cells in the generated notebook.
pub const CELL_COUNT: usize = STEPS.len();

enum Step {
    Markdown(&'static str),
    Code(&'static str),
    /// Code reading the five tables from the data directory.
    LoadTables,
}

impl Step {
    fn to_cell(&self, data_dir: &str) -> Cell {
        match self {
            Step::Markdown(text) => make_markdown_cell(*text),
            Step::Code(text) => make_code_cell(*text),
            Step::LoadTables => make_code_cell(format!(
                "# File paths\nDATA_DIR = {}\n{}",
                python_str_literal(data_dir),
                LOAD_TABLES
            )),
        }
    }
}

/// Build the full notebook, reading tables from `data_dir`.
pub fn diagnoses_eda(data_dir: &str) -> Document {
    build_document(diagnoses_eda_cells(data_dir), Metadata::python3())
}

/// The notebook's cells, in order.
pub fn diagnoses_eda_cells(data_dir: &str) -> Vec<Cell> {
    STEPS.iter().map(|step| step.to_cell(data_dir)).collect()
}

/// Quote `text` as a single-quoted Python string.
fn python_str_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' | '\'' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

const STEPS: [Step; 21] = [
    Step::Markdown(TITLE),
    Step::Code(SETUP),
    Step::Markdown("## 1. Load Data"),
    Step::LoadTables,
    Step::Markdown("## 2. Preview Table Structures"),
    Step::Code(PREVIEW_TABLES),
    Step::Markdown("## 3. Join Tables: Link Patients, Admissions, ICU Stays, and Diagnoses"),
    Step::Code(JOIN_TABLES),
    Step::Markdown("## 4. EDA: Diagnoses and ICD Codes"),
    Step::Code(TOP_DIAGNOSES),
    Step::Code(DIAGNOSES_PER_PATIENT),
    Step::Code(DIAGNOSES_PER_STAY),
    Step::Code(TOP_ICD9_CODES),
    Step::Code(ADMISSIONS_PER_PATIENT),
    Step::Code(PRIMARY_DIAGNOSES),
    Step::Code(SEQ_NUM_DISTRIBUTION),
    Step::Code(AGE_BY_DIAGNOSIS),
    Step::Code(GENDER_BY_DIAGNOSIS),
    Step::Code(DIAGNOSES_PER_YEAR),
    Step::Code(COMORBIDITY_PAIRS),
    Step::Markdown(FURTHER_EXPLORATION),
];

const TITLE: &str = r#"# MIMIC-III EDA: Diagnoses and ICD Codes

This notebook explores the diagnoses and ICD code tables in the MIMIC-III dataset, and demonstrates how to join them with patient and ICU stay information.
"#;

const SETUP: &str = r#"import pandas as pd
import matplotlib.pyplot as plt
import seaborn as sns

# Set display options
pd.set_option('display.max_columns', 100)
sns.set(style='whitegrid')
"#;

/// Everything in the load cell after the `DATA_DIR` assignment.
const LOAD_TABLES: &str = r#"patients = pd.read_csv(DATA_DIR + 'PATIENTS.csv')
admissions = pd.read_csv(DATA_DIR + 'ADMISSIONS.csv')
icustays = pd.read_csv(DATA_DIR + 'ICUSTAYS.csv')
diagnoses_icd = pd.read_csv(DATA_DIR + 'DIAGNOSES_ICD.csv')
d_icd_diagnoses = pd.read_csv(DATA_DIR + 'D_ICD_DIAGNOSES.csv')

print('Loaded tables:')
for name, df in [('patients', patients), ('admissions', admissions), ('icustays', icustays), ('diagnoses_icd', diagnoses_icd), ('d_icd_diagnoses', d_icd_diagnoses)]:
    print(f'{name}: {df.shape}')
"#;

const PREVIEW_TABLES: &str = r#"from IPython.display import display

display(patients.head())
display(admissions.head())
display(icustays.head())
display(diagnoses_icd.head())
display(d_icd_diagnoses.head())
"#;

const JOIN_TABLES: &str = r#"# Merge diagnoses with ICD descriptions
diagnoses_full = diagnoses_icd.merge(d_icd_diagnoses, how='left', left_on='ICD9_CODE', right_on='ICD9_CODE')
# Merge with admissions to get patient and admission info
diagnoses_full = diagnoses_full.merge(admissions, how='left', on='HADM_ID')
# Merge with patients to get demographic info
diagnoses_full = diagnoses_full.merge(patients, how='left', on='SUBJECT_ID')
# Merge with icustays to get ICU stay info (optional, not all admissions have ICU stays)
diagnoses_full = diagnoses_full.merge(icustays, how='left', on=['SUBJECT_ID', 'HADM_ID'])

print('Diagnoses full shape:', diagnoses_full.shape)
from IPython.display import display
display(diagnoses_full.head())
"#;

const TOP_DIAGNOSES: &str = r#"# Most common diagnoses
top_diagnoses = diagnoses_full['LONG_TITLE'].value_counts().head(20)
plt.figure(figsize=(8,8))
sns.barplot(y=top_diagnoses.index, x=top_diagnoses.values, orient='h')
plt.title('Top 20 Most Common Diagnoses')
plt.xlabel('Count')
plt.ylabel('Diagnosis')
plt.tight_layout()
plt.show()
"#;

const DIAGNOSES_PER_PATIENT: &str = r#"# Number of unique diagnoses per patient
diagnoses_per_patient = diagnoses_full.groupby('SUBJECT_ID')['ICD9_CODE'].nunique()
plt.figure(figsize=(8,4))
sns.histplot(diagnoses_per_patient, bins=30, kde=True)
plt.title('Distribution of Unique Diagnoses per Patient')
plt.xlabel('Number of Unique Diagnoses')
plt.ylabel('Number of Patients')
plt.show()
"#;

const DIAGNOSES_PER_STAY: &str = r#"# Number of diagnoses per ICU stay
diagnoses_per_stay = diagnoses_full.groupby('ICUSTAY_ID')['ICD9_CODE'].nunique().dropna()
plt.figure(figsize=(8,4))
sns.histplot(diagnoses_per_stay, bins=30, kde=True)
plt.title('Distribution of Unique Diagnoses per ICU Stay')
plt.xlabel('Number of Unique Diagnoses')
plt.ylabel('Number of ICU Stays')
plt.show()
"#;

const TOP_ICD9_CODES: &str = r#"# Top ICD9 codes (not just descriptions)
top_icd9 = diagnoses_full['ICD9_CODE'].value_counts().head(20)
plt.figure(figsize=(8,8))
sns.barplot(y=top_icd9.index, x=top_icd9.values, orient='h')
plt.title('Top 20 Most Common ICD9 Codes')
plt.xlabel('Count')
plt.ylabel('ICD9 Code')
plt.tight_layout()
plt.show()
"#;

const ADMISSIONS_PER_PATIENT: &str = r#"# Number of admissions per patient
admissions_per_patient = admissions.groupby('SUBJECT_ID')['HADM_ID'].nunique()
plt.figure(figsize=(8,4))
sns.histplot(admissions_per_patient, bins=30, kde=True)
plt.title('Distribution of Admissions per Patient')
plt.xlabel('Number of Admissions')
plt.ylabel('Number of Patients')
plt.show()
"#;

const PRIMARY_DIAGNOSES: &str = r#"# Most common primary diagnoses (SEQ_NUM == 1)
primary_diag = diagnoses_full[diagnoses_full['SEQ_NUM'] == 1]
top_primary = primary_diag['LONG_TITLE'].value_counts().head(20)
plt.figure(figsize=(8,8))
sns.barplot(y=top_primary.index, x=top_primary.values, orient='h')
plt.title('Top 20 Most Common Primary Diagnoses')
plt.xlabel('Count')
plt.ylabel('Primary Diagnosis')
plt.tight_layout()
plt.show()
"#;

const SEQ_NUM_DISTRIBUTION: &str = r#"# Distribution of diagnosis sequence numbers
plt.figure(figsize=(8,4))
sns.histplot(diagnoses_full['SEQ_NUM'], bins=30, kde=True)
plt.title('Distribution of Diagnosis Sequence Numbers (SEQ_NUM)')
plt.xlabel('Diagnosis Sequence Number')
plt.ylabel('Count')
plt.show()
"#;

const AGE_BY_DIAGNOSIS: &str = r#"# Age distribution for top 5 diagnoses
from datetime import datetime

def calculate_age(row):
    try:
        dob = pd.to_datetime(row['DOB'])
        adm = pd.to_datetime(row['ADMITTIME'])
        age = (adm - dob).days / 365.25
        return age
    except:
        return None

diagnoses_full['AGE'] = diagnoses_full.apply(calculate_age, axis=1)
top5_diag = top_diagnoses.index[:5]
plt.figure(figsize=(10,6))
for diag in top5_diag:
    sns.kdeplot(diagnoses_full[diagnoses_full['LONG_TITLE'] == diag]['AGE'].dropna(), label=diag)
plt.title('Age Distribution for Top 5 Diagnoses')
plt.xlabel('Age at Admission')
plt.ylabel('Density')
plt.legend()
plt.show()
"#;

const GENDER_BY_DIAGNOSIS: &str = r#"# Gender distribution for top 5 diagnoses
gender_counts = diagnoses_full[diagnoses_full['LONG_TITLE'].isin(top5_diag)].groupby(['LONG_TITLE', 'GENDER']).size().unstack().fillna(0)
gender_counts.plot(kind='bar', stacked=True, figsize=(10,6))
plt.title('Gender Distribution for Top 5 Diagnoses')
plt.xlabel('Diagnosis')
plt.ylabel('Count')
plt.legend(title='Gender')
plt.tight_layout()
plt.show()
"#;

const DIAGNOSES_PER_YEAR: &str = r#"# Diagnoses per year
diagnoses_full['ADMIT_YEAR'] = pd.to_datetime(diagnoses_full['ADMITTIME']).dt.year
trend = diagnoses_full.groupby('ADMIT_YEAR')['ICD9_CODE'].count()
plt.figure(figsize=(10,4))
trend.plot(marker='o')
plt.title('Number of Diagnoses per Year')
plt.xlabel('Year')
plt.ylabel('Number of Diagnoses')
plt.tight_layout()
plt.show()
"#;

const COMORBIDITY_PAIRS: &str = r#"# Most common pairs of diagnoses (comorbidities)
from itertools import combinations
from collections import Counter

# For speed, use a sample if the dataset is very large
sample = diagnoses_full[['HADM_ID', 'ICD9_CODE']].drop_duplicates()
grouped = sample.groupby('HADM_ID')['ICD9_CODE'].apply(list)
pairs = Counter()
for codes in grouped:
    for pair in combinations(sorted(set(codes)), 2):
        pairs[pair] += 1
common_pairs = pairs.most_common(10)
print('Top 10 most common comorbidity pairs (ICD9 codes):')
for (code1, code2), count in common_pairs:
    print(f'{code1} & {code2}: {count}')
"#;

const FURTHER_EXPLORATION: &str = "## 5. Further Exploration\nYou can extend this notebook to explore comorbidities, trends over time, or link to other tables (e.g., procedures, outcomes).";

#[cfg(test)]
mod test {
    use super::*;
    use crate::notebook::{read_document, write_document, Cell};
    use std::fs;

    #[test]
    fn cell_sequence() {
        let cells = diagnoses_eda_cells(DEFAULT_DATA_DIR);
        assert_eq!(cells.len(), 21);
        assert_eq!(cells.len(), CELL_COUNT);

        let markdown: Vec<_> = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| matches!(cell, Cell::Markdown(_)))
            .map(|(idx, _)| idx)
            .collect();
        assert_eq!(markdown, [0, 2, 4, 6, 8, 20]);
        assert!(cells[0].source().starts_with("# MIMIC-III EDA: Diagnoses and ICD Codes\n"));
        assert_eq!(cells[2].source(), "## 1. Load Data");
        assert!(cells[20]
            .source()
            .starts_with("## 5. Further Exploration\nYou can extend"));
        assert!(cells[19].source().starts_with("# Most common pairs of diagnoses"));
    }

    #[test]
    fn matches_checked_in_notebook() {
        let expected = include_str!("testdata/MIMIC_EDA_Diagnoses.ipynb");
        let generated = diagnoses_eda(DEFAULT_DATA_DIR).to_json_string().unwrap();
        for (idx, (got, want)) in generated.lines().zip(expected.lines()).enumerate() {
            assert_eq!(got, want, "line {} differs", idx + 1);
        }
        assert_eq!(generated, expected);
    }

    #[test]
    fn code_cells_are_unexecuted() {
        let document = diagnoses_eda(DEFAULT_DATA_DIR);
        let code: Vec<_> = document.cells().iter().filter_map(Cell::as_code).collect();
        assert_eq!(code.len(), 15);
        for cell in code {
            assert_eq!(cell.execution_count(), None);
            assert!(cell.outputs().is_empty());
        }
    }

    #[test]
    fn fixed_metadata() {
        let document = diagnoses_eda(DEFAULT_DATA_DIR);
        assert_eq!(document.metadata().kernelspec.display_name, "Python 3");
        assert_eq!(document.metadata().kernelspec.name, "python3");
        assert_eq!(document.metadata().language_info.name, "python");
        assert_eq!(document.format_version(), (4, 5));
    }

    #[test]
    fn load_cell_uses_data_dir() {
        let cells = diagnoses_eda_cells(DEFAULT_DATA_DIR);
        assert!(cells[3].source().starts_with(
            "# File paths\nDATA_DIR = './mimic-iii-clinical-database-1.4/'\npatients = pd.read_csv("
        ));

        let cells = diagnoses_eda_cells("/data/it's\\here/");
        assert!(cells[3]
            .source()
            .contains("DATA_DIR = '/data/it\\'s\\\\here/'\n"));
    }

    #[test]
    fn generation_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.ipynb");
        let second = dir.path().join("second.ipynb");
        write_document(&diagnoses_eda(DEFAULT_DATA_DIR), &first).unwrap();
        write_document(&diagnoses_eda(DEFAULT_DATA_DIR), &second).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn written_notebook_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda.ipynb");
        let document = diagnoses_eda(DEFAULT_DATA_DIR);
        write_document(&document, &path).unwrap();

        let reread = read_document(&path).unwrap();
        assert_eq!(reread, document);
        assert_eq!(
            reread.to_json_string().unwrap(),
            fs::read_to_string(&path).unwrap()
        );
    }
}
