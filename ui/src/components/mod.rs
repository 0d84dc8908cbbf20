pub mod address_list;
pub mod dark_mode_toggle;
pub mod error_panel;
pub mod layout;
pub mod metrics_panel;
pub mod modal;
pub mod pagination_controls;
pub mod password_form;
pub mod profile_form;
pub mod refresh_controls;
pub mod require_role;
pub mod toast;
pub mod user_form;
pub mod users_table;

pub use address_list::AddressList;
pub use dark_mode_toggle::DarkModeToggle;
pub use error_panel::ErrorPanel;
pub use layout::MainLayout;
pub use metrics_panel::MetricsPanel;
pub use modal::{ConfirmDialog, Modal};
pub use pagination_controls::PaginationControls;
pub use password_form::{PasswordChange, PasswordForm, PasswordRequirements};
pub use profile_form::ProfileForm;
pub use refresh_controls::RefreshControls;
pub use require_role::RequireRole;
pub use toast::ToastContainer;
pub use user_form::{AddUserModal, EditUserModal};
pub use users_table::UsersTable;
