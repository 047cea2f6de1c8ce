//! Stages the frontend build for `include_dir!`.
//!
//! `trunk build` in `frontend/` writes `frontend/dist`; its content is copied
//! into `backend/static/dist`. Without a frontend build the directory is
//! still created so the server compiles and serves only the API.

use std::fs;
use std::path::Path;

const SPA_DIST: &str = "../frontend/dist";
const EMBED_DIR: &str = "static/dist";

fn main() {
    let embed_dir = Path::new(EMBED_DIR);
    let spa_dist = Path::new(SPA_DIST);

    let _ = fs::remove_dir_all(embed_dir);
    fs::create_dir_all(embed_dir).expect("cannot create static/dist");
    if spa_dist.exists() {
        let options = fs_extra::dir::CopyOptions::new().overwrite(true).content_only(true);
        fs_extra::dir::copy(spa_dist, embed_dir, &options).expect("cannot copy the frontend build");
    }
    println!("cargo:rerun-if-changed={}", SPA_DIST);
}
