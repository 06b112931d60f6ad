// Payment gateway client

pub mod razorpay;

pub use razorpay::RazorpayClient;
