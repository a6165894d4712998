//! One-call request helpers.

use log::debug;
use winant_core::Method;
use winant_http::{
    ClientConfig, Error, HttpRequest, HttpResponse, RequestBuilder, RequestDescriptor,
    RequestOption, TcpTransport, Transport,
};

/// A transport paired with the configuration its requests use.
///
/// A `Client` holds no connections; every request opens and releases its
/// own handles.
#[derive(Debug, Clone, Default)]
pub struct Client<T = TcpTransport> {
    transport: T,
    config: ClientConfig,
}

impl Client<TcpTransport> {
    /// A client over plain TCP with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Client<T> {
    /// A client over `transport` with default settings.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            config: ClientConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// The transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request from `options` and run it.
    pub fn request<'h, I>(&self, method: Method, options: I) -> Result<HttpResponse, Error>
    where
        I: IntoIterator<Item = RequestOption<'h>>,
    {
        let descriptor = RequestBuilder::new(method).options(options).build()?;
        self.execute(descriptor)
    }

    /// `GET` with `options`.
    pub fn get<'h, I>(&self, options: I) -> Result<HttpResponse, Error>
    where
        I: IntoIterator<Item = RequestOption<'h>>,
    {
        self.request(Method::Get, options)
    }

    /// `POST` with `options`.
    pub fn post<'h, I>(&self, options: I) -> Result<HttpResponse, Error>
    where
        I: IntoIterator<Item = RequestOption<'h>>,
    {
        self.request(Method::Post, options)
    }

    /// `HEAD` with `options`.
    pub fn head<'h, I>(&self, options: I) -> Result<HttpResponse, Error>
    where
        I: IntoIterator<Item = RequestOption<'h>>,
    {
        self.request(Method::Head, options)
    }

    /// Open a built request without starting it.
    pub fn open<'h>(&self, descriptor: RequestDescriptor<'h>) -> Result<HttpRequest<'h, T>, Error> {
        HttpRequest::from_descriptor(&self.transport, &self.config, descriptor)
    }

    /// Open and run a built request.
    ///
    /// The transport handles are released before this returns, on success
    /// and on failure.
    pub fn execute(&self, descriptor: RequestDescriptor<'_>) -> Result<HttpResponse, Error> {
        debug!("{} {}", descriptor.method(), descriptor.url());
        self.open(descriptor)?.start()
    }
}

/// Run a request over `transport` with `config`.
pub fn request_with<'h, T, I>(
    transport: &T,
    config: &ClientConfig,
    method: Method,
    options: I,
) -> Result<HttpResponse, Error>
where
    T: Transport,
    I: IntoIterator<Item = RequestOption<'h>>,
{
    let descriptor = RequestBuilder::new(method).options(options).build()?;
    debug!("{} {}", descriptor.method(), descriptor.url());
    HttpRequest::from_descriptor(transport, config, descriptor)?.start()
}

/// Run a request over plain TCP with default settings.
pub fn request<'h, I>(method: Method, options: I) -> Result<HttpResponse, Error>
where
    I: IntoIterator<Item = RequestOption<'h>>,
{
    Client::new().request(method, options)
}

/// `GET` over plain TCP with default settings.
pub fn get<'h, I>(options: I) -> Result<HttpResponse, Error>
where
    I: IntoIterator<Item = RequestOption<'h>>,
{
    request(Method::Get, options)
}

/// `POST` over plain TCP with default settings.
pub fn post<'h, I>(options: I) -> Result<HttpResponse, Error>
where
    I: IntoIterator<Item = RequestOption<'h>>,
{
    request(Method::Post, options)
}

/// `HEAD` over plain TCP with default settings.
pub fn head<'h, I>(options: I) -> Result<HttpResponse, Error>
where
    I: IntoIterator<Item = RequestOption<'h>>,
{
    request(Method::Head, options)
}
