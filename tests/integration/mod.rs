mod detail;
mod navigation;
mod requests;
mod resize;
