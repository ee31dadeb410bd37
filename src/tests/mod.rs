mod url;
mod wifi;
