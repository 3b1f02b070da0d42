//! FILENAME: core/grid-engine/tests/common/mod.rs
//! Shared fixtures for grid-engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use grid_engine::{
    ColumnDescriptor, ColumnEntry, ColumnGroup, ColumnSet, ElementList, GridRow, GridValue,
    GroupDefinition, GroupKey, Pipeline, PipelineOptions,
};

/// A test record.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub dept: String,
    pub age: f64,
}

/// Summary computed per group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub total_age: f64,
}

pub type TestPipeline = Pipeline<Person, GridValue, GridValue, GroupStats>;
pub type TestGroup = GroupDefinition<Person, GridValue, GroupStats>;
pub type TestList = ElementList<GridValue, Person, GroupStats>;

pub fn person(name: &str, dept: &str, age: f64) -> Arc<Person> {
    Arc::new(Person {
        name: name.to_string(),
        dept: dept.to_string(),
        age,
    })
}

/// `[{name:"A",age:30},{name:"B",age:25}]`
pub fn two_people() -> Vec<Arc<Person>> {
    vec![person("A", "", 30.0), person("B", "", 25.0)]
}

/// `[{dept:"X",age:30},{dept:"X",age:20},{dept:"Y",age:40}]`
pub fn three_in_two_depts() -> Vec<Arc<Person>> {
    vec![
        person("p30", "X", 30.0),
        person("p20", "X", 20.0),
        person("p40", "Y", 40.0),
    ]
}

/// A larger, deterministic dataset with many ties.
pub fn staff(count: usize) -> Vec<Arc<Person>> {
    let depts = ["Sales", "Ops", "Eng", "Legal"];
    (0..count)
        .map(|i| {
            person(
                &format!("P{:04}", i),
                depts[(i * 7) % depts.len()],
                (20 + (i * 13) % 30) as f64,
            )
        })
        .collect()
}

pub fn create_test_columns() -> ColumnSet<Person, GridValue> {
    let entries: Vec<ColumnEntry<Person, GridValue>> = vec![
        ColumnDescriptor::new("name", |p: &Person| GridValue::text(p.name.clone())).into(),
        ColumnGroup::new(
            "details",
            vec![
                ColumnDescriptor::new("dept", |p: &Person| GridValue::text(p.dept.clone())),
                ColumnDescriptor::new("age", |p: &Person| GridValue::number(p.age)),
            ],
        )
        .into(),
    ];
    ColumnSet::new(entries).expect("test columns are unique")
}

pub fn stats(members: &[&Person], _key: &GroupKey<GridValue>) -> GroupStats {
    GroupStats {
        count: members.len(),
        total_age: members.iter().map(|p| p.age).sum(),
    }
}

pub fn create_test_pipeline(options: PipelineOptions) -> TestPipeline {
    Pipeline::new(create_test_columns())
        .with_reducer(stats)
        .with_options(options)
}

pub fn dept_group() -> TestGroup {
    GroupDefinition::new("dept", |p: &Person| GridValue::text(p.dept.clone()))
        .with_title("Department")
}

/// Element rows' names, in display order.
pub fn element_names(list: &TestList) -> Vec<String> {
    list.iter()
        .filter_map(GridRow::as_element)
        .map(|row| row.content.name.clone())
        .collect()
}
