pub mod forgejo;
