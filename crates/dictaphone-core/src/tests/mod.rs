mod device;
mod permission;
mod session;
