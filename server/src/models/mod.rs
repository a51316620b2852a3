pub mod organization;
pub mod project;
pub mod time_sheet;
pub mod user;

pub use organization::{NewOrganization, Organization, OrganizationChanges, OrganizationFilter};
pub use project::{NewProject, Project, ProjectChanges, ProjectFilter, StatusChoice};
pub use time_sheet::{open_sentinel, NewTimeSheet, TimeCorrection, TimeSheet, TimeSheetFilter};
pub use user::{NewUser, User, UserChanges, UserFilter};
