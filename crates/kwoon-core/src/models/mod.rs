//! Data models for the school-management API.
//!
//! - `User`, `Role`: accounts and their roles
//! - `School`, `Student`, `StudentProfile`, `BranchProgress`: membership and progress
//! - `Enrollment`: requests to join a school
//! - `Lesson`, `LessonSchedule`, `Attendance`: training sessions
//! - `Event`, `EventRegistration`, `EventEligibility`: events and seminars
//! - `GradeRequirement`, `Product`, `ServiceRequest`, `MailRequest`, `Media`
//! - `DashboardStats`: role-dependent summary counters
//!
//! List endpoints wrap results in [`Page`].

pub mod common;
pub mod dashboard;
pub mod enrollment;
pub mod event;
pub mod grade;
pub mod lesson;
pub mod mail;
pub mod media;
pub mod product;
pub mod request;
pub mod school;
pub mod student;
pub mod user;

pub use common::{ActionResponse, Page};
pub use dashboard::{AdminStats, DashboardStats, ManagerStats, StudentStats};
pub use enrollment::{Enrollment, EnrollmentRequest, EnrollmentStatus};
pub use event::{
    Event, EventEligibility, EventInput, EventRegistration, EventScope, EventType,
    RegistrationForm, RegistrationReceipt, SeminarEvaluation,
};
pub use grade::{GradeRequirement, GradeRequirementUpdate, ManualGradeChange, NewGradeRequirement};
pub use lesson::{
    Attendance, AttendanceRecord, Lesson, LessonFilter, LessonSchedule, LessonType, NewLesson,
    NewLessonSchedule,
};
pub use mail::{EmailLog, MailRequest};
pub use media::{Media, MediaType, YoutubeImport};
pub use product::{NewProductCategory, Product, ProductCategory, ProductInput};
pub use request::{
    HandleRequest, NewRequest, RequestFilter, RequestStatus, RequestType, ServiceRequest,
};
pub use school::{AssignManager, Instructor, MySchool, School, SchoolInput};
pub use student::{
    AvatarUpload, Branch, BranchProgress, Student, StudentApproval, StudentFilter,
    StudentProfile, StudentProgress, StudentSortColumn,
};
pub use user::{
    InstructorTitle, NewUser, Registration, Role, User, UserFilter, UserStatus, UserUpdate,
};
