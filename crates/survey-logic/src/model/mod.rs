pub mod component;
pub mod page;
pub mod rule;
pub mod survey;

pub use component::{Component, Constraint, QuestionKind};
pub use page::{BranchRule, BranchTarget, Page, PageId};
pub use rule::{Combinator, Condition, Operator, Rule};
pub use survey::{Survey, SurveySettings};
