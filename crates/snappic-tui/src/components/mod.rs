pub mod gallery_view;
pub mod upload_form;
