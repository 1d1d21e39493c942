pub mod binding;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod result;
pub mod value;

pub use binding::{Arguments, ExtensionBindings, MemberBinding};
pub use context::{CallContext, RequestContext};
pub use descriptor::{ConfigureFn, ObjectTypeDescriptor, TypeDescriptorBuilder};
pub use dispatch::{DispatchEntry, DispatchFn, DispatchTable, ResolverId};
pub use error::{RegistrationError, ResolverError};
pub use result::AsyncResult;
pub use value::{ObjectValue, Value};

pub use tokio_util::sync::CancellationToken;
