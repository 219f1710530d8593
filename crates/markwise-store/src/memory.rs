//! In-memory store, for tests and dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use markwise_core::model::{Module, Student};
use markwise_core::traits::{ModuleStore, StudentStore};

/// A process-local store backed by hash maps.
#[derive(Default)]
pub struct MemoryStore {
    modules: Mutex<HashMap<String, Module>>,
    students: Mutex<HashMap<(String, String), Student>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_module(&self, module: Module) {
        self.modules
            .lock()
            .unwrap()
            .insert(module.module_id.clone(), module);
    }

    pub fn insert_student(&self, student: Student) {
        self.students.lock().unwrap().insert(
            (student.module_id.clone(), student.student_id.clone()),
            student,
        );
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    async fn find_module(&self, module_id: &str) -> anyhow::Result<Option<Module>> {
        Ok(self.modules.lock().unwrap().get(module_id).cloned())
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn list_students(&self, module_id: &str) -> anyhow::Result<Vec<Student>> {
        let mut students: Vec<Student> = self
            .students
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.module_id == module_id)
            .cloned()
            .collect();
        students.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(students)
    }

    async fn find_student(
        &self,
        module_id: &str,
        student_id: &str,
    ) -> anyhow::Result<Option<Student>> {
        Ok(self
            .students
            .lock()
            .unwrap()
            .get(&(module_id.to_string(), student_id.to_string()))
            .cloned())
    }

    async fn upsert_student(&self, student: &Student) -> anyhow::Result<()> {
        self.insert_student(student.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markwise_core::model::Answer;

    fn student(module_id: &str, student_id: &str) -> Student {
        Student {
            student_id: student_id.into(),
            module_id: module_id.into(),
            answers: vec![Answer {
                question_no: 1,
                student_answer: "answer".into(),
                student_marks: 0,
                feedback: String::new(),
            }],
            total_marks: 0,
        }
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_module() {
        let store = MemoryStore::new();
        store.insert_student(student("cs101", "IT2002"));
        store.insert_student(student("cs101", "IT2001"));
        store.insert_student(student("ma201", "IT2003"));

        let students = store.list_students("cs101").await.unwrap();
        let ids: Vec<&str> = students.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["IT2001", "IT2002"]);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_record() {
        let store = MemoryStore::new();
        store.insert_student(student("cs101", "IT2001"));

        let mut updated = student("cs101", "IT2001");
        updated.total_marks = 42;
        store.upsert_student(&updated).await.unwrap();

        let found = store.find_student("cs101", "IT2001").await.unwrap().unwrap();
        assert_eq!(found.total_marks, 42);
    }

    #[tokio::test]
    async fn absent_module_is_none() {
        let store = MemoryStore::new();
        assert!(store.find_module("nope").await.unwrap().is_none());
    }
}
