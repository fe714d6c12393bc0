//! Departments and semesters offered by the resource library.

use serde::{Deserialize, Serialize};

/// Semester labels, in display order.
pub const SEMESTERS: [&str; 8] = [
    "1st Semester",
    "2nd Semester",
    "3rd Semester",
    "4th Semester",
    "5th Semester",
    "6th Semester",
    "7th Semester",
    "8th Semester",
];

/// An engineering department that resources are filed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Department {
    Computer,
    Civil,
    Electrical,
    Mechanical,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Computer,
        Department::Civil,
        Department::Electrical,
        Department::Mechanical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Computer => "Computer",
            Department::Civil => "Civil",
            Department::Electrical => "Electrical",
            Department::Mechanical => "Mechanical",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            Department::Computer => "Programming, Software & Hardware",
            Department::Civil => "Construction, Design & Planning",
            Department::Electrical => "Power, Circuits & Control",
            Department::Mechanical => "Machines, Tools & Manufacturing",
        }
    }
}

/// Returns the canonical label for a semester, ignoring case.
pub fn canonical_semester(label: &str) -> Option<&'static str> {
    SEMESTERS
        .into_iter()
        .find(|s| s.eq_ignore_ascii_case(label.trim()))
}

/// Department entry in the resource library listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInfo {
    pub id: Department,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<Department> for DepartmentInfo {
    fn from(department: Department) -> Self {
        Self {
            id: department,
            name: department.as_str(),
            description: department.description(),
        }
    }
}

/// Semester picker for one department.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSemesters {
    pub department: Department,
    pub semesters: Vec<&'static str>,
}
