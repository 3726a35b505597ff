mod calltype;
mod invocation;
mod policy;
mod repository;

pub use calltype::{Calltype, SubjectScope};
pub use invocation::{InvocationSubject, InvocationTime, WebserviceInvocation, SUBJECT_KEY_SEPARATOR};
pub use policy::{ThrottlePolicy, DEFAULT_QUARANTINE_DAYS};
pub use repository::WebserviceHistoryRepository;
