//! The three admin forms: resources, job updates and notices.

use serde_json::json;

use super::{AdminForm, FormGates, SubmitGate};
use crate::models::{
    canonical_semester, Collection, Department, Document, JobDraft, JobUpdate, Notice,
    NoticeDraft, Resource, ResourceDraft,
};
use crate::views::{project_job, project_notice, project_resource};

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl AdminForm for ResourceDraft {
    type Record = Resource;

    const COLLECTION: Collection = Collection::Resources;
    const SUCCESS_MESSAGE: &'static str = "Resource added successfully!";
    const FAILURE_MESSAGE: &'static str = "Failed to add resource.";

    fn validate(&self) -> Result<(), &'static str> {
        if is_blank(&self.title) || is_blank(&self.link) {
            return Err("Please fill all fields");
        }
        if Department::from_str(&self.category).is_none() {
            return Err("Please choose a valid department");
        }
        if canonical_semester(&self.semester).is_none() {
            return Err("Please choose a valid semester");
        }
        Ok(())
    }

    fn to_document(&self) -> serde_json::Value {
        let category = Department::from_str(&self.category)
            .map(|d| d.as_str())
            .unwrap_or_default();
        let semester = canonical_semester(&self.semester).unwrap_or_default();

        json!({
            "title": self.title.trim(),
            "category": category,
            "semester": semester,
            "pdfLink": self.link.trim(),
        })
    }

    /// Department and semester stay selected for the next upload.
    fn clear(&mut self) {
        self.title.clear();
        self.link.clear();
    }

    fn project(document: &Document, now_ms: i64) -> Resource {
        project_resource(document, now_ms)
    }

    fn gate(gates: &FormGates) -> &SubmitGate {
        &gates.resources
    }
}

impl AdminForm for JobDraft {
    type Record = JobUpdate;

    const COLLECTION: Collection = Collection::Jobs;
    const SUCCESS_MESSAGE: &'static str = "Job update posted successfully!";
    const FAILURE_MESSAGE: &'static str = "Failed to post job update";

    fn validate(&self) -> Result<(), &'static str> {
        if is_blank(&self.title) || is_blank(&self.description) {
            return Err("Please fill title and description");
        }
        Ok(())
    }

    fn to_document(&self) -> serde_json::Value {
        json!({
            "title": self.title.trim(),
            "description": self.description.trim(),
            "link": self.link.trim(),
            "imageUrl": self.image_url.trim(),
        })
    }

    fn clear(&mut self) {
        *self = JobDraft::default();
    }

    fn project(document: &Document, now_ms: i64) -> JobUpdate {
        project_job(document, now_ms)
    }

    fn gate(gates: &FormGates) -> &SubmitGate {
        &gates.jobs
    }
}

impl AdminForm for NoticeDraft {
    type Record = Notice;

    const COLLECTION: Collection = Collection::Notices;
    const SUCCESS_MESSAGE: &'static str = "Notice sent successfully!";
    const FAILURE_MESSAGE: &'static str = "Failed to send notice";

    fn validate(&self) -> Result<(), &'static str> {
        if is_blank(&self.title) || is_blank(&self.text) {
            return Err("Please enter both title and message");
        }
        Ok(())
    }

    fn to_document(&self) -> serde_json::Value {
        json!({
            "title": self.title.trim(),
            "text": self.text.trim(),
        })
    }

    fn clear(&mut self) {
        *self = NoticeDraft::default();
    }

    fn project(document: &Document, now_ms: i64) -> Notice {
        project_notice(document, now_ms)
    }

    fn gate(gates: &FormGates) -> &SubmitGate {
        &gates.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_requires_title_and_link() {
        let draft = ResourceDraft {
            title: "Hydraulics".to_string(),
            category: "Civil".to_string(),
            semester: "5th Semester".to_string(),
            link: String::new(),
        };
        assert_eq!(draft.validate(), Err("Please fill all fields"));
    }

    #[test]
    fn test_resource_rejects_unknown_department_and_semester() {
        let mut draft = ResourceDraft {
            title: "Organic Chemistry".to_string(),
            category: "Chemistry".to_string(),
            semester: "1st Semester".to_string(),
            link: "https://drive.example/x".to_string(),
        };
        assert_eq!(draft.validate(), Err("Please choose a valid department"));

        draft.category = "civil".to_string();
        draft.semester = "Final Semester".to_string();
        assert_eq!(draft.validate(), Err("Please choose a valid semester"));
    }

    #[test]
    fn test_resource_document_uses_canonical_names() {
        let draft = ResourceDraft {
            title: " Circuits ".to_string(),
            category: "electrical".to_string(),
            semester: "2ND SEMESTER".to_string(),
            link: "https://drive.example/c".to_string(),
        };
        assert!(draft.validate().is_ok());
        let document = draft.to_document();
        assert_eq!(document["title"], "Circuits");
        assert_eq!(document["category"], "Electrical");
        assert_eq!(document["semester"], "2nd Semester");
        assert_eq!(document["pdfLink"], "https://drive.example/c");
    }

    #[test]
    fn test_job_optional_fields_are_trimmed() {
        let draft = JobDraft {
            title: "Draftsman".to_string(),
            description: "Full time".to_string(),
            link: "  ".to_string(),
            image_url: " https://img.example/circular.png ".to_string(),
        };
        let document = draft.to_document();
        assert_eq!(document["link"], "");
        assert_eq!(document["imageUrl"], "https://img.example/circular.png");
    }

    #[test]
    fn test_notice_requires_title_and_text() {
        let draft = NoticeDraft {
            title: String::new(),
            text: "Results are out".to_string(),
        };
        assert_eq!(draft.validate(), Err("Please enter both title and message"));
    }
}
