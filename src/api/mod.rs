//! HTTP API module for the Institute Rules Engine.
//!
//! This module exposes the billing, attendance, leave and payroll rules as
//! stateless JSON endpoints. Callers identify themselves through the
//! `x-user-id` and `x-user-role` headers.

mod auth;
mod handlers;
mod request;
mod response;
mod state;

pub use auth::{AuthContext, Role, USER_ID_HEADER, USER_ROLE_HEADER};
pub use handlers::create_router;
pub use request::{
    ApproveLeaveRequest, CheckInRequest, CheckOutRequest, EndDateRequest, InternshipPriceRequest,
    LeaveBalanceRequest, LeaveRequestBody, RejectLeaveRequest, ResumeRequest,
    ReviewAttendanceRequest, SalarySlipRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, AttendanceResponse, EndDateResponse, InternshipPriceResponse,
    InvoiceTotalsResponse, LeaveApprovalResponse, LeaveBalanceResponse, LeaveRejectionResponse,
    LeaveSettlement, PricedItemsResponse, ResumeResponse, SalarySlipResponse,
};
pub use state::AppState;
